pub mod capture_fixture;
pub mod doctor;
pub mod plan;
pub mod run;
pub mod validate;

/// Shared helper: load a config path, printing warnings as they're
/// discovered and bailing with [`crate::exit_code::ExitCode::Fatal`]-style
/// errors for anything the loader itself rejects.
pub(crate) fn load_config(path: &std::path::Path) -> anyhow::Result<scrapcore_config::LoadedConfig> {
    scrapcore_config::load(path).map_err(|e| anyhow::anyhow!("{e}"))
}
