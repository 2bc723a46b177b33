use anyhow::Result;
use daygrid_core::config::GlobalConfig;

/// Debug surface: which backend is active, which calendar, and where the
/// config and data live.
pub fn run(ctx: &super::Context) -> Result<()> {
    println!("Backend:  {}", ctx.store.kind());
    println!("Calendar: {}", ctx.calendar_id);
    println!("Config:   {}", GlobalConfig::config_path()?.display());
    println!("Data:     {}", ctx.config.data_path()?.display());
    Ok(())
}
