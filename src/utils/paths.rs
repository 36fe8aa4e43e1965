use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub fn get_tracker_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(home.join(".parsha-tracker"))
}

pub fn get_config_path() -> Result<PathBuf> {
    let dir = get_tracker_dir()?;
    Ok(dir.join("config.toml"))
}

pub fn get_database_path() -> Result<PathBuf> {
    let dir = get_tracker_dir()?;
    Ok(dir.join("progress.db"))
}

pub fn get_default_data_file() -> Result<PathBuf> {
    let dir = get_tracker_dir()?;
    Ok(dir.join("torah_readings.json"))
}

pub fn get_logs_dir() -> Result<PathBuf> {
    let dir = get_tracker_dir()?;
    Ok(dir.join("logs"))
}

pub fn get_pid_file_path() -> Result<PathBuf> {
    let dir = get_tracker_dir()?;
    Ok(dir.join("server.pid"))
}

pub fn get_crash_log_path() -> Result<PathBuf> {
    let dir = get_tracker_dir()?;
    Ok(dir.join("crash.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tracker_dir() {
        let dir = get_tracker_dir().unwrap();
        assert!(dir.to_string_lossy().ends_with(".parsha-tracker"));
    }

    #[test]
    fn test_get_config_path() {
        let path = get_config_path().unwrap();
        assert!(path.to_string_lossy().contains(".parsha-tracker"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_get_database_path() {
        let path = get_database_path().unwrap();
        assert!(path.to_string_lossy().contains(".parsha-tracker"));
        assert!(path.to_string_lossy().ends_with("progress.db"));
    }

    #[test]
    fn test_get_default_data_file() {
        let path = get_default_data_file().unwrap();
        assert!(path.to_string_lossy().ends_with("torah_readings.json"));
    }

    #[test]
    fn test_get_logs_dir() {
        let dir = get_logs_dir().unwrap();
        assert!(dir.to_string_lossy().contains(".parsha-tracker"));
        assert!(dir.to_string_lossy().ends_with("logs"));
    }

    #[test]
    fn test_get_pid_file_path() {
        let path = get_pid_file_path().unwrap();
        assert!(path.to_string_lossy().ends_with("server.pid"));
    }
}
