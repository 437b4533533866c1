use sparse_lowering::conversion::codes::dim_level_type_encoding;
use sparse_lowering::conversion::runtime::RUNTIME_ENTRY_POINTS;
use sparse_lowering::conversion::{Action, OverheadType, PrimaryType};
use sparse_lowering::ir::DimLevelType;

pub fn cmd_abi() {
    println!("entry points:");
    for entry in RUNTIME_ENTRY_POINTS {
        println!("  {:<18} {}", entry.name, entry.signature);
    }

    println!("\nprimary types:");
    for primary in PrimaryType::ALL {
        println!("  {:<4} {}", primary.suffix(), primary as u32);
    }

    println!("\noverhead types:");
    for overhead in OverheadType::ALL {
        println!("  {:<4} {}", overhead.name(), overhead as u32);
    }

    println!("\ndimension level types:");
    for dlt in [DimLevelType::Dense, DimLevelType::Compressed, DimLevelType::Singleton] {
        println!("  {:<10} {}", dlt, dim_level_type_encoding(dlt));
    }

    println!("\nactions:");
    for action in [Action::FromMetadata, Action::FromData] {
        println!("  {:<12} {}", format!("{:?}", action), action as u32);
    }
}
