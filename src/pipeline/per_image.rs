use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::time::{timeout, Duration};

use crate::classifier::ClassifierGateway;
use crate::config::PipelineConfig;
use crate::io::ImageInput;
use crate::models::{ImageRecord, Pass1Result};

use super::policy;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Run pass 1 (and, when gated in, pass 2) for every image of a property.
///
/// Images are classified concurrently up to `max_concurrent_images`; each
/// image's failure is terminal for that image only and never aborts the
/// rest of the run. Results come back in input order so re-runs with the
/// same classifier responses are deterministic.
pub async fn classify_images(
    gateway: Arc<dyn ClassifierGateway>,
    config: &PipelineConfig,
    images: Vec<ImageInput>,
) -> Vec<ImageRecord> {
    let mut records: Vec<(usize, ImageRecord)> = stream::iter(images.into_iter().enumerate())
        .map(|(index, image)| {
            let gateway = Arc::clone(&gateway);
            async move { (index, classify_one(gateway.as_ref(), config, image).await) }
        })
        .buffer_unordered(config.max_concurrent_images.max(1))
        .collect()
        .await;

    records.sort_by_key(|(index, _)| *index);
    records.into_iter().map(|(_, record)| record).collect()
}

async fn classify_one(
    gateway: &dyn ClassifierGateway,
    config: &PipelineConfig,
    image: ImageInput,
) -> ImageRecord {
    let call_timeout = Duration::from_secs(config.classify_timeout_secs);
    let filename = image.filename;

    log_info!("Running pass 1 for {filename}");
    let pass1 = match timeout(call_timeout, gateway.classify_pass1(&image.data_url)).await {
        Ok(Ok(response)) => Pass1Result {
            room_type: response.room_type,
            actionable: response.actionable,
            confidence: response.confidence,
        },
        Ok(Err(err)) => {
            log_error!("Pass 1 failed for {filename}: {err:#}");
            return ImageRecord::failed(filename, format!("pass 1 failed: {err:#}"));
        }
        Err(_) => {
            log_warn!(
                "Pass 1 timed out (> {}s) for {filename}",
                config.classify_timeout_secs
            );
            return ImageRecord::failed(
                filename,
                format!("pass 1 timed out after {}s", config.classify_timeout_secs),
            );
        }
    };

    if !policy::is_target_image(config, &pass1) {
        return ImageRecord {
            filename,
            pass1: Some(pass1),
            pass2: Vec::new(),
            error: None,
        };
    }

    log_info!("Running pass 2 for {filename}");
    match timeout(
        call_timeout,
        gateway.classify_pass2(&image.data_url, pass1.room_type),
    )
    .await
    {
        Ok(Ok(response)) => {
            let pass2 = policy::filter_whitelisted(&filename, response.features);
            ImageRecord {
                filename,
                pass1: Some(pass1),
                pass2,
                error: None,
            }
        }
        Ok(Err(err)) => {
            log_error!("Pass 2 failed for {filename}: {err:#}");
            ImageRecord {
                filename,
                pass1: Some(pass1),
                pass2: Vec::new(),
                error: Some(format!("pass 2 failed: {err:#}")),
            }
        }
        Err(_) => {
            log_warn!(
                "Pass 2 timed out (> {}s) for {filename}",
                config.classify_timeout_secs
            );
            ImageRecord {
                filename,
                pass1: Some(pass1),
                pass2: Vec::new(),
                error: Some(format!(
                    "pass 2 timed out after {}s",
                    config.classify_timeout_secs
                )),
            }
        }
    }
}
