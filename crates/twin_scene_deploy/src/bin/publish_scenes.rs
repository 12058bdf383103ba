use std::fs;
use std::path::PathBuf;

use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use clap::Parser;
use twin_scene_core::SceneConfig;
use twin_scene_deploy::adapters::object_store::{LocalDirectoryStore, SceneStore};
use twin_scene_deploy::handlers::publish::{publish_scenes, PublishConfig, PublishReport};

type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(
    name = "publish_scenes",
    about = "Generate the fleet and inspection scenes and publish them with a manifest"
)]
struct Cli {
    /// Number of vehicles in the fleet
    #[arg(long, env = "TWINFLEET_VEHICLE_COUNT", default_value_t = 3)]
    vehicle_count: u32,
    /// Number of the first vehicle (vehicles are named vin<n>)
    #[arg(long, env = "TWINFLEET_VEHICLE_BASE", default_value_t = 100)]
    vehicle_base: u32,
    /// Bucket URI that holds the 3D assets and scenes, e.g. s3://my-bucket
    #[arg(long, env = "TWINFLEET_BUCKET_URI")]
    bucket_uri: String,
    /// JSON file overriding layout and naming defaults
    #[arg(long, env = "TWINFLEET_SCENE_CONFIG")]
    config: Option<PathBuf>,
    /// Key prefix for every published object
    #[arg(long, env = "TWINFLEET_SCENE_PREFIX", default_value = "")]
    prefix: String,
    /// Write objects below this directory instead of S3
    #[arg(long, conflicts_with = "s3_bucket", required_unless_present = "s3_bucket")]
    output_dir: Option<PathBuf>,
    /// Destination S3 bucket name
    #[arg(long, env = "TWINFLEET_S3_BUCKET")]
    s3_bucket: Option<String>,
}

/// Blocking `SceneStore` over S3, bridged onto the ambient tokio runtime.
struct S3SceneStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl SceneStore for S3SceneStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .content_type("application/json")
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }
}

fn load_scene_config(path: Option<&PathBuf>) -> Result<SceneConfig, Error> {
    let Some(path) = path else {
        return Ok(SceneConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;
    Ok(SceneConfig::from_json_str(&text)?)
}

fn print_report(report: &PublishReport) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(&report.scenes)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let scene_config = load_scene_config(cli.config.as_ref())?;
    let publish_config = PublishConfig {
        bucket_uri: cli.bucket_uri,
        prefix: cli.prefix,
        vehicle_count: cli.vehicle_count,
        vehicle_base_number: cli.vehicle_base,
        published_at: Utc::now().to_rfc3339(),
    };

    let report = match (cli.output_dir, cli.s3_bucket) {
        (Some(output_dir), _) => {
            let store = LocalDirectoryStore::new(output_dir);
            publish_scenes(&scene_config, &publish_config, &store)?
        }
        (None, Some(bucket)) => {
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let store = S3SceneStore {
                bucket,
                s3_client: aws_sdk_s3::Client::new(&aws_config),
            };
            publish_scenes(&scene_config, &publish_config, &store)?
        }
        (None, None) => return Err("either --output-dir or --s3-bucket is required".into()),
    };

    print_report(&report)
}
