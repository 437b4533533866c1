/// Source-language address spaces, in the order the maps index them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LangAddressSpace {
    Default,
    OpenclGlobal,
    OpenclLocal,
    OpenclConstant,
    OpenclPrivate,
    OpenclGeneric,
    OpenclGlobalDevice,
    OpenclGlobalHost,
    CudaDevice,
    CudaConstant,
    CudaShared,
    SyclGlobal,
    SyclGlobalDevice,
    SyclGlobalHost,
    SyclLocal,
    SyclPrivate,
    Ptr32Sptr,
    Ptr32Uptr,
    Ptr64,
}

impl LangAddressSpace {
    pub const COUNT: usize = 19;

    pub const ALL: [LangAddressSpace; Self::COUNT] = [
        Self::Default,
        Self::OpenclGlobal,
        Self::OpenclLocal,
        Self::OpenclConstant,
        Self::OpenclPrivate,
        Self::OpenclGeneric,
        Self::OpenclGlobalDevice,
        Self::OpenclGlobalHost,
        Self::CudaDevice,
        Self::CudaConstant,
        Self::CudaShared,
        Self::SyclGlobal,
        Self::SyclGlobalDevice,
        Self::SyclGlobalHost,
        Self::SyclLocal,
        Self::SyclPrivate,
        Self::Ptr32Sptr,
        Self::Ptr32Uptr,
        Self::Ptr64,
    ];

    /// Key used in target files and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::OpenclGlobal => "opencl_global",
            Self::OpenclLocal => "opencl_local",
            Self::OpenclConstant => "opencl_constant",
            Self::OpenclPrivate => "opencl_private",
            Self::OpenclGeneric => "opencl_generic",
            Self::OpenclGlobalDevice => "opencl_global_device",
            Self::OpenclGlobalHost => "opencl_global_host",
            Self::CudaDevice => "cuda_device",
            Self::CudaConstant => "cuda_constant",
            Self::CudaShared => "cuda_shared",
            Self::SyclGlobal => "sycl_global",
            Self::SyclGlobalDevice => "sycl_global_device",
            Self::SyclGlobalHost => "sycl_global_host",
            Self::SyclLocal => "sycl_local",
            Self::SyclPrivate => "sycl_private",
            Self::Ptr32Sptr => "ptr32_sptr",
            Self::Ptr32Uptr => "ptr32_uptr",
            Self::Ptr64 => "ptr64",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|space| space.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Language address space to target address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressSpaceMap {
    table: [u32; LangAddressSpace::COUNT],
}

impl AddressSpaceMap {
    /// Unannotated pointers live in the private address space (OpenCL C).
    pub const SPIR_DEFAULT_IS_PRIVATE: Self = Self {
        table: [0, 1, 3, 2, 0, 4, 5, 6, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    };

    /// Unannotated pointers live in the generic address space (SYCL device
    /// code). The OpenCL entries other than global and constant are unused.
    pub const SPIR_DEFAULT_IS_GENERIC: Self = Self {
        table: [4, 1, 0, 2, 0, 0, 0, 0, 0, 0, 0, 1, 5, 6, 3, 0, 0, 0, 0],
    };

    pub fn spir(default_is_generic: bool) -> Self {
        if default_is_generic {
            Self::SPIR_DEFAULT_IS_GENERIC
        } else {
            Self::SPIR_DEFAULT_IS_PRIVATE
        }
    }

    pub fn get(&self, space: LangAddressSpace) -> u32 {
        self.table[space.index()]
    }

    pub fn set(&mut self, space: LangAddressSpace, target: u32) {
        self.table[space.index()] = target;
    }

    /// `(language space, target space)` pairs in table order.
    pub fn entries(&self) -> impl Iterator<Item = (LangAddressSpace, u32)> + '_ {
        LangAddressSpace::ALL.into_iter().map(|space| (space, self.get(space)))
    }
}
