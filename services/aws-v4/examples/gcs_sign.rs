use anyhow::Result;
use s3sign_aws_v4::{Backend, Config, RequestSigner};
use s3sign_core::{Context, OsEnv};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging for debugging
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = Context::new().with_env(OsEnv);

    // A signer that signs everything but the SigV4 defaults is rejected for GCS.
    if let Err(e) = RequestSigner::new("s3", "auto").validate(Backend::Gcs) {
        println!("Default signer refused for GCS: {e}");
    }

    // Build the GCS signer from env, falling back to demo HMAC keys.
    let config = Config {
        backend: Some(Backend::Gcs),
        ..Default::default()
    }
    .from_env(&ctx)?;
    let config = if config.access_key_id.is_none() {
        println!("No HMAC keys found, using demo credentials for example");
        Config {
            access_key_id: Some("GOOG1EXAMPLEACCESSKEY".to_string()),
            secret_access_key: Some("demo-secret-access-key".to_string()),
            ..config
        }
    } else {
        config
    };
    println!("Endpoint: {}", config.endpoint()?);
    let signer = config.into_signer(ctx)?;

    let req = http::Request::get("https://storage.googleapis.com/my-test-bucket/test-file.txt")
        .header("accept-encoding", "gzip")
        .body(())?;
    let (mut parts, _body) = req.into_parts();

    match signer.sign(&mut parts, None).await {
        Ok(_) => {
            println!("Request signed successfully!");
            println!(
                "Authorization header: {:?}",
                parts.headers.get("authorization")
            );
        }
        Err(e) => eprintln!("Failed to sign request: {e}"),
    }

    Ok(())
}
