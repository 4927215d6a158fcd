// Author: Dustin Pilgrim
// License: MIT

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use rune_cfg::RuneConfig;
use wayback_core::MatchPolicy;

use crate::paths::default_config_path;

pub const DEFAULT_COMPOSITOR_PATH: &str = match option_env!("WAYBACK_COMPOSITOR_EXEC_PATH") {
    Some(p) => p,
    None => "/usr/libexec/wayback-compositor",
};

pub const DEFAULT_XWAYLAND_PATH: &str = match option_env!("XWAYLAND_EXEC_PATH") {
    Some(p) => p,
    None => "/usr/bin/Xwayland",
};

/// Values from wayback.rune; everything is optional.
#[derive(Debug, Clone, Default)]
pub struct XwaybackConfig {
    pub compositor_path: Option<PathBuf>,
    pub xwayland_path: Option<PathBuf>,
    pub output: Option<String>,
    pub output_match: MatchPolicy,
}

/// Effective settings after applying environment overrides and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub compositor_path: PathBuf,
    pub xwayland_path: PathBuf,
    pub output: Option<String>,
    pub output_match: MatchPolicy,
}

pub fn load() -> Result<XwaybackConfig, String> {
    let path = default_config_path();

    if !path.exists() {
        return Ok(XwaybackConfig::default());
    }

    let rc = RuneConfig::from_file(&path).map_err(|e| format!("failed to read config: {e}"))?;

    parse_config(&rc)
}

fn parse_config(rc: &RuneConfig) -> Result<XwaybackConfig, String> {
    let mut cfg = XwaybackConfig::default();

    if !rc.has("xwayback") {
        return Ok(cfg);
    }

    if let Some(p) = rc
        .get_optional::<String>("xwayback.compositor_path")
        .map_err(|e| format!("config error at xwayback.compositor_path: {e}"))?
    {
        cfg.compositor_path = non_empty(&p).map(expand_env);
    }

    if let Some(p) = rc
        .get_optional::<String>("xwayback.xwayland_path")
        .map_err(|e| format!("config error at xwayback.xwayland_path: {e}"))?
    {
        cfg.xwayland_path = non_empty(&p).map(expand_env);
    }

    if let Some(o) = rc
        .get_optional::<String>("xwayback.output")
        .map_err(|e| format!("config error at xwayback.output: {e}"))?
    {
        cfg.output = non_empty(&o).map(str::to_string);
    }

    if let Some(m) = rc
        .get_optional::<String>("xwayback.output_match")
        .map_err(|e| format!("config error at xwayback.output_match: {e}"))?
    {
        cfg.output_match = parse_match_policy(&m)
            .map_err(|e| format!("config error at xwayback.output_match: {e}"))?;
    }

    Ok(cfg)
}

pub fn parse_match_policy(s: &str) -> Result<MatchPolicy, String> {
    match s.trim().to_lowercase().as_str() {
        "first" => Ok(MatchPolicy::First),
        "last" => Ok(MatchPolicy::Last),
        other => Err(format!("expected first|last, got \"{other}\"")),
    }
}

/// Priority per key: environment, config file, built-in default.
/// Empty environment values count as unset.
pub fn resolve<F>(cfg: &XwaybackConfig, var: F) -> Settings
where
    F: Fn(&str) -> Option<OsString>,
{
    let from_env = |key: &str| var(key).filter(|v| !v.is_empty());

    let compositor_path = from_env("WAYBACK_COMPOSITOR_PATH")
        .map(PathBuf::from)
        .or_else(|| cfg.compositor_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPOSITOR_PATH));

    let xwayland_path = from_env("XWAYLAND_PATH")
        .map(PathBuf::from)
        .or_else(|| cfg.xwayland_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_XWAYLAND_PATH));

    let output = from_env("WAYBACK_OUTPUT")
        .map(|v| v.to_string_lossy().into_owned())
        .or_else(|| cfg.output.clone());

    Settings {
        compositor_path,
        xwayland_path,
        output,
        output_match: cfg.output_match,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

fn expand_env(s: &str) -> PathBuf {
    let mut out = s.to_string();

    if out.contains("$env.HOME") {
        if let Ok(home) = env::var("HOME") {
            out = out.replace("$env.HOME", &home);
        }
    }

    PathBuf::from(out)
}
