//! Dummy data command handler

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_seed(config: Config, count: u32) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;

    let inserted = shared.pcb_type_service.seed(count).await?;
    let total = shared.pcb_type_service.count().await?;

    println!("✓ Created {inserted} dummy PCB types ({total} total)");
    Ok(())
}
