use std::path::Path;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use s2uc::PipelineParams;
use s2uc::api::{process_dataset, process_directory};

use super::args::CliArgs;
use super::errors::AppError;

/// Resolve pipeline parameters: config file first, then command line overrides.
pub fn resolve_params(args: &CliArgs) -> Result<PipelineParams, AppError> {
    let mut params = match &args.config {
        Some(path) => {
            PipelineParams::from_json_file(path).map_err(|source| AppError::InvalidConfig {
                path: path.display().to_string(),
                source,
            })?
        }
        None => PipelineParams::default(),
    };
    if let Some(crs) = &args.target_crs {
        params.target_crs = crs.clone();
    }
    if let Some(resampling) = &args.warp_resampling {
        params.warp_resampling = resampling.clone();
    }
    if args.keep_intermediates {
        params.keep_intermediates = true;
    }
    if args.write_masks {
        params.write_masks = true;
    }
    Ok(params)
}

fn required<'a, T: ?Sized>(value: Option<&'a T>, arg: &str) -> Result<&'a T, AppError> {
    value.ok_or_else(|| AppError::MissingArgument {
        arg: arg.to_string(),
    })
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    if args.log {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let params = resolve_params(&args)?;
    let src_root: &Path = required(args.path.as_deref(), "--path")?;
    let dst_root: &Path = required(args.dstpath.as_deref(), "--dstpath")?;

    if args.batch {
        info!("Starting batch processing from directory: {:?}", src_root);
        info!("Output directory: {:?}", dst_root);
        let report = process_directory(src_root, dst_root, &params, true)?;
        if report.errors > 0 {
            return Err(AppError::BatchFailures {
                errors: report.errors,
            });
        }
    } else {
        let name = required(args.name.as_deref(), "--name")?;
        info!("Processing dataset {}", name);
        match process_dataset(src_root, name, dst_root, &params) {
            Ok(report) => {
                info!(
                    "Successfully processed {} (sensor {}) -> {:?}",
                    report.dataset, report.sensor, report.composite
                );
            }
            Err(e) => {
                error!("{}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
