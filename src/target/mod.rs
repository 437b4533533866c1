//! Machine parameters for the SPIR virtual targets.
//!
//! Built-in `spir` and `spir64` descriptions are fixed tables. Variants
//! (SYCL device, Xilinx FPGA, Windows) are selected through
//! `TargetOptions`, and a target file can derive from either base and
//! override individual parameters.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::span::Span;

mod address_space;
pub use address_space::{AddressSpaceMap, LangAddressSpace};

const SPIR_DATA_LAYOUT: &str = "e-i64:64-v16:16-v24:32-v32:32-v48:64-\
v96:128-v192:256-v256:256-v512:512-v1024:1024-n8:16:32:64";

const SPIR_FPGA_DATA_LAYOUT: &str = "e-m:e-p:32:32-i64:64-i128:128-i256:256-i512:512-i1024:1024-i2048:\
2048-i4096:4096-n8:16:32:64-S128-v16:16-v24:32-v32:32-v48:64-v96:\
128-v192:256-v256:256-v512:512-v1024:1024";

const SPIR64_FPGA_DATA_LAYOUT: &str = "e-m:e-i64:64-i128:128-i256:256-i512:512-i1024:1024-i2048:2048-i4096:\
4096-n8:16:32:64-S128-v16:16-v24:32-v32:32-v48:64-v96:128-v192:256-\
v256:256-v512:512-v1024:1024";

// ─── Calling conventions ──────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallingConv {
    C,
    X86StdCall,
    X86FastCall,
    X86VectorCall,
    SpirFunction,
    OpenclKernel,
}

impl CallingConv {
    pub fn name(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::X86StdCall => "x86_stdcall",
            Self::X86FastCall => "x86_fastcall",
            Self::X86VectorCall => "x86_vectorcall",
            Self::SpirFunction => "spir_function",
            Self::OpenclKernel => "opencl_kernel",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallingConvCheck {
    Ok,
    /// Accepted, but the frontend should warn and fall back to the default.
    Warning,
}

// ─── Integer types ────────────────────────────────────────────────

/// C integer type backing `size_t` and `ptrdiff_t`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntType {
    SignedInt,
    UnsignedInt,
    SignedLong,
    UnsignedLong,
    SignedLongLong,
    UnsignedLongLong,
}

impl IntType {
    pub fn name(self) -> &'static str {
        match self {
            Self::SignedInt => "int",
            Self::UnsignedInt => "unsigned int",
            Self::SignedLong => "long",
            Self::UnsignedLong => "unsigned long",
            Self::SignedLongLong => "long long",
            Self::UnsignedLongLong => "unsigned long long",
        }
    }
}

// ─── Target description ───────────────────────────────────────────

/// Variant switches applied on top of a base target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetOptions {
    /// Compiling SYCL device code.
    pub sycl_device: bool,
    /// Xilinx FPGA triple: selects the FPGA data layout.
    pub xilinx_fpga: bool,
    /// Windows host ABI. Implies a SYCL device target.
    pub windows: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetInfo {
    /// Short identifier (e.g. "spir64").
    pub name: String,
    /// Pointer width and alignment in bits.
    pub pointer_width: u32,
    pub long_width: u32,
    pub size_type: IntType,
    pub ptr_diff_type: IntType,
    /// 0 if atomics are never lowered inline.
    pub max_atomic_inline_width: u32,
    pub data_layout: String,
    pub address_space_map: AddressSpaceMap,
    pub tls_supported: bool,
    pub vla_supported: bool,
    pub has_float16: bool,
    pub has_int128: bool,
    /// Windows headers use `__vectorcall`.
    pub accepts_vectorcall: bool,
}

impl TargetInfo {
    fn spir_base(name: &str, pointer_width: u32, opts: TargetOptions) -> Self {
        Self {
            name: name.to_string(),
            pointer_width,
            long_width: 64,
            size_type: IntType::UnsignedInt,
            ptr_diff_type: IntType::SignedInt,
            max_atomic_inline_width: 0,
            data_layout: SPIR_DATA_LAYOUT.to_string(),
            address_space_map: AddressSpaceMap::spir(opts.sycl_device),
            tls_supported: false,
            vla_supported: false,
            has_float16: true,
            has_int128: false,
            accepts_vectorcall: false,
        }
    }

    /// 32-bit SPIR.
    pub fn spir(opts: TargetOptions) -> Self {
        let mut info = Self::spir_base("spir", 32, opts);
        if opts.xilinx_fpga {
            info.data_layout = SPIR_FPGA_DATA_LAYOUT.to_string();
        }
        if opts.sycl_device || opts.windows {
            info.max_atomic_inline_width = 32;
        }
        if opts.windows {
            info.accepts_vectorcall = true;
        }
        info
    }

    /// 64-bit SPIR.
    pub fn spir64(opts: TargetOptions) -> Self {
        let mut info = Self::spir_base("spir64", 64, opts);
        info.size_type = IntType::UnsignedLong;
        info.ptr_diff_type = IntType::SignedLong;
        if opts.xilinx_fpga {
            info.data_layout = SPIR64_FPGA_DATA_LAYOUT.to_string();
        }
        if opts.sycl_device || opts.windows {
            info.max_atomic_inline_width = 64;
        }
        if opts.windows {
            info.long_width = 32;
            info.size_type = IntType::UnsignedLongLong;
            info.ptr_diff_type = IntType::SignedLongLong;
            info.accepts_vectorcall = true;
        }
        info
    }

    /// Built-in target by name.
    pub fn builtin(name: &str, opts: TargetOptions) -> Option<Self> {
        match name {
            "spir" => Some(Self::spir(opts)),
            "spir64" => Some(Self::spir64(opts)),
            _ => None,
        }
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        feature == "spir"
    }

    /// Pick the address space map for the language mode.
    pub fn set_address_space_map(&mut self, default_is_generic: bool) {
        self.address_space_map = AddressSpaceMap::spir(default_is_generic);
    }

    pub fn target_address_space(&self, space: LangAddressSpace) -> u32 {
        self.address_space_map.get(space)
    }

    /// DWARF address spaces coincide with target address spaces.
    pub fn dwarf_address_space(&self, address_space: u32) -> Option<u32> {
        Some(address_space)
    }

    pub fn check_calling_convention(&self, cc: CallingConv) -> CallingConvCheck {
        match cc {
            CallingConv::SpirFunction | CallingConv::OpenclKernel => CallingConvCheck::Ok,
            CallingConv::X86VectorCall if self.accepts_vectorcall => CallingConvCheck::Ok,
            _ => CallingConvCheck::Warning,
        }
    }

    pub fn default_calling_conv(&self) -> CallingConv {
        CallingConv::SpirFunction
    }

    // ─── Resolution ───────────────────────────────────────────────

    /// Resolve a target by name: built-ins first, then `targets/{name}.toml`
    /// relative to the binary or the working directory.
    pub fn resolve(name: &str, opts: TargetOptions) -> Result<Self, Diagnostic> {
        // Reject path traversal
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || name.starts_with('.')
        {
            return Err(Diagnostic::error(
                format!("invalid target name '{}'", name),
                Span::dummy(),
            ));
        }

        if let Some(info) = Self::builtin(name, opts) {
            tracing::debug!(name, "using built-in target");
            return Ok(info);
        }

        let relative = format!("targets/{}.toml", name);
        for base in search_roots() {
            let path = base.join(&relative);
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading target file");
                return Self::load(&path);
            }
        }

        Err(Diagnostic::error(
            format!("unknown target '{}' (looked for '{}')", name, relative),
            Span::dummy(),
        )
        .with_help("available targets: spir, spir64".to_string()))
    }

    /// Load a target description from a TOML file.
    pub fn load(path: &Path) -> Result<Self, Diagnostic> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Diagnostic::error(
                format!("cannot read target file '{}': {}", path.display(), e),
                Span::dummy(),
            )
        })?;
        Self::parse_toml(&content, path)
    }

    /// Parse a target file. Errors on a specific line carry that line's
    /// byte span.
    pub fn parse_toml(content: &str, path: &Path) -> Result<Self, Diagnostic> {
        let err = |msg: String, span: Span| {
            Diagnostic::error(format!("{}: {}", path.display(), msg), span)
        };

        let mut name = String::new();
        let mut base = String::new();
        let mut base_span = Span::dummy();
        let mut opts = TargetOptions::default();
        let mut data_layout: Option<String> = None;
        let mut long_width: Option<u32> = None;
        let mut max_atomic: Option<u32> = None;
        let mut default_is_generic: Option<bool> = None;
        let mut overrides: Vec<(LangAddressSpace, u32)> = Vec::new();

        let mut section = String::new();
        let mut offset = 0usize;

        for line in content.split_inclusive('\n') {
            let start = offset;
            offset += line.len();
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let lead = line.len() - line.trim_start().len();
            let span = Span::new(0, (start + lead) as u32, (start + lead + trimmed.len()) as u32);

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(err(format!("expected 'key = value', found '{}'", trimmed), span));
            };
            let key = key.trim();
            let value = value.trim();
            let unquoted = value.trim_matches('"');

            let number = |what: &str| -> Result<u32, Diagnostic> {
                value
                    .parse()
                    .map_err(|_| err(format!("invalid {}: {}", what, value), span))
            };
            let flag = |what: &str| -> Result<bool, Diagnostic> {
                match value {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    _ => Err(err(format!("invalid {}: {} (expected true or false)", what, value), span)),
                }
            };

            match (section.as_str(), key) {
                ("target", "name") => name = unquoted.to_string(),
                ("target", "base") => {
                    base = unquoted.to_string();
                    base_span = span;
                }
                ("options", "sycl_device") => opts.sycl_device = flag("options.sycl_device")?,
                ("options", "xilinx_fpga") => opts.xilinx_fpga = flag("options.xilinx_fpga")?,
                ("options", "windows") => opts.windows = flag("options.windows")?,
                ("layout", "data_layout") => data_layout = Some(unquoted.to_string()),
                ("layout", "long_width") => long_width = Some(number("layout.long_width")?),
                ("layout", "max_atomic_inline_width") => {
                    max_atomic = Some(number("layout.max_atomic_inline_width")?)
                }
                ("address_space", "default_is_generic") => {
                    default_is_generic = Some(flag("address_space.default_is_generic")?)
                }
                ("address_space", space) => {
                    let Some(space) = LangAddressSpace::from_name(space) else {
                        return Err(err(format!("unknown address space '{}'", space), span));
                    };
                    overrides.push((space, number(&format!("address_space.{}", space.name()))?));
                }
                (section, key) => {
                    tracing::warn!(section, key, "ignoring unknown target file key");
                }
            }
        }

        if name.is_empty() {
            return Err(err("missing target.name".to_string(), Span::dummy()));
        }
        if base.is_empty() {
            return Err(err("missing target.base".to_string(), Span::dummy()));
        }
        let mut info = Self::builtin(&base, opts).ok_or_else(|| {
            err(
                format!("unknown base target '{}' (expected 'spir' or 'spir64')", base),
                base_span,
            )
            .with_help("a target file derives from a built-in target".to_string())
        })?;

        info.name = name;
        if let Some(layout) = data_layout {
            info.data_layout = layout;
        }
        if let Some(width) = long_width {
            info.long_width = width;
        }
        if let Some(width) = max_atomic {
            info.max_atomic_inline_width = width;
        }
        if let Some(generic) = default_is_generic {
            info.set_address_space_map(generic);
        }
        for (space, target) in overrides {
            info.address_space_map.set(space, target);
        }
        Ok(info)
    }
}

/// Directories searched for `targets/`: the binary's directory and two of
/// its ancestors, then the working directory.
fn search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        let mut dir = exe.parent();
        for _ in 0..3 {
            let Some(d) = dir else { break };
            roots.push(d.to_path_buf());
            dir = d.parent();
        }
    }
    roots.push(PathBuf::from("."));
    roots
}

impl fmt::Display for TargetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "target {}", self.name)?;
        writeln!(f, "  pointer width:      {}", self.pointer_width)?;
        writeln!(f, "  long width:         {}", self.long_width)?;
        writeln!(f, "  size type:          {}", self.size_type.name())?;
        writeln!(f, "  ptrdiff type:       {}", self.ptr_diff_type.name())?;
        writeln!(f, "  max atomic inline:  {}", self.max_atomic_inline_width)?;
        writeln!(f, "  calling convention: {}", self.default_calling_conv().name())?;
        writeln!(f, "  data layout:        {}", self.data_layout)?;
        write!(f, "  address spaces:")?;
        for (space, target) in self.address_space_map.entries() {
            write!(f, "\n    {:<22} {}", space.name(), target)?;
        }
        Ok(())
    }
}
