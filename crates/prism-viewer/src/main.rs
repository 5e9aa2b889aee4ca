use anyhow::{Context, Result, bail};

use prism_engine::app::ApplicationOptions;
use prism_engine::device::GpuInit;
use prism_engine::logging::{LoggingConfig, init_logging};
use prism_engine::render::{MeshData, MeshScene};
use prism_engine::window::{Runtime, RuntimeConfig};

const USAGE: &str = "usage: prism-viewer [--direct | --composer] [--max-pixel-ratio <ratio>]";

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let env = std::env::var("PRISM_USE_COMPOSER").ok();
    let options = parse_options(std::env::args().skip(1), env.as_deref())?;
    log::info!(
        "starting prism-viewer (composer {}, max pixel ratio {})",
        if options.use_composer { "on" } else { "off" },
        options.max_pixel_ratio
    );

    let scene = MeshScene::new(MeshData::octahedron());
    Runtime::run(RuntimeConfig::default(), GpuInit::default(), options, scene)
}

/// Command line wins over `PRISM_USE_COMPOSER`.
fn parse_options(
    args: impl IntoIterator<Item = String>,
    use_composer_env: Option<&str>,
) -> Result<ApplicationOptions> {
    let mut options = ApplicationOptions::default();

    if let Some(value) = use_composer_env {
        options.use_composer = parse_flag(value)
            .with_context(|| format!("invalid PRISM_USE_COMPOSER value '{value}'"))?;
    }

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--direct" => options.use_composer = false,
            "--composer" => options.use_composer = true,
            "--max-pixel-ratio" => {
                let value = args.next().context("--max-pixel-ratio needs a value")?;
                options.max_pixel_ratio = value
                    .parse()
                    .with_context(|| format!("invalid pixel ratio '{value}'"))?;
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument '{other}'\n{USAGE}"),
        }
    }

    options.validate()?;
    Ok(options)
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("expected a boolean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_composer() {
        let options = parse_options(args(&[]), None).unwrap();
        assert!(options.use_composer);
        assert_eq!(options.max_pixel_ratio, 2.0);
    }

    #[test]
    fn direct_flag_disables_composer() {
        let options = parse_options(args(&["--direct"]), None).unwrap();
        assert!(!options.use_composer);
    }

    #[test]
    fn command_line_overrides_env() {
        let options = parse_options(args(&["--composer"]), Some("off")).unwrap();
        assert!(options.use_composer);

        let options = parse_options(args(&[]), Some("0")).unwrap();
        assert!(!options.use_composer);
    }

    #[test]
    fn rejects_bad_pixel_ratio() {
        assert!(parse_options(args(&["--max-pixel-ratio", "0"]), None).is_err());
        assert!(parse_options(args(&["--max-pixel-ratio"]), None).is_err());
        let options = parse_options(args(&["--max-pixel-ratio", "1.5"]), None).unwrap();
        assert_eq!(options.max_pixel_ratio, 1.5);
    }

    #[test]
    fn rejects_unknown_arguments_and_env_values() {
        assert!(parse_options(args(&["--fast"]), None).is_err());
        assert!(parse_options(args(&[]), Some("maybe")).is_err());
    }
}
