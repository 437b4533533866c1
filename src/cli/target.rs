use std::path::PathBuf;
use std::process;

use clap::Args;
use sparse_lowering::target::{TargetInfo, TargetOptions};

#[derive(Args)]
pub struct TargetArgs {
    /// Built-in target (spir, spir64) or a name resolved from targets/<NAME>.toml
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    pub name: Option<String>,
    /// Load the target from a file instead
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Compile SYCL device code
    #[arg(long)]
    pub sycl_device: bool,
    /// Use the Xilinx FPGA data layout
    #[arg(long)]
    pub fpga: bool,
    /// Windows host ABI
    #[arg(long)]
    pub windows: bool,
}

pub fn cmd_target(args: TargetArgs) {
    let opts = TargetOptions {
        sycl_device: args.sycl_device,
        xilinx_fpga: args.fpga,
        windows: args.windows,
    };

    let info = match (&args.name, &args.config) {
        (_, Some(path)) => match TargetInfo::load(path) {
            Ok(info) => info,
            Err(diag) => {
                let source = std::fs::read_to_string(path).unwrap_or_default();
                diag.render(&path.display().to_string(), &source);
                process::exit(1);
            }
        },
        (Some(name), None) => match TargetInfo::resolve(name, opts) {
            Ok(info) => info,
            Err(diag) => {
                eprintln!("error: {}", diag.message);
                if let Some(help) = &diag.help {
                    eprintln!("  help: {}", help);
                }
                process::exit(1);
            }
        },
        (None, None) => {
            eprintln!("error: expected a target name or --config <FILE>");
            process::exit(1);
        }
    };

    println!("{}", info);
}
