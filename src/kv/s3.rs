use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;

use crate::config::KvConfig;
use crate::error::KvError;

/// One object per key in an S3-compatible bucket.
pub struct S3Kv {
    pub client: Client,
    bucket: String,
    prefix: String,
}

impl S3Kv {
    pub async fn new(cfg: &KvConfig) -> Result<Self, KvError> {
        let KvConfig::S3 {
            bucket,
            prefix,
            aws_region,
            aws_endpoint_url_s3,
            aws_access_key_id,
            aws_secret_access_key,
        } = cfg
        else {
            return Err(KvError::InvalidValue("not an s3 kv config".to_string()));
        };

        let credentials = Credentials::new(aws_access_key_id, aws_secret_access_key, None, None, "config");

        let config = aws_config::from_env()
            .region(aws_config::Region::new(aws_region.clone()))
            .endpoint_url(aws_endpoint_url_s3)
            .credentials_provider(credentials)
            .load()
            .await;

        tracing::info!("[kv] using s3 bucket {} with prefix {:?}", bucket, prefix);

        Ok(Self {
            client: Client::new(&config),
            bucket: bucket.clone(),
            prefix: prefix.clone(),
        })
    }

    fn object_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await;

        let output = match response {
            Ok(output) => output,
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    return Ok(None);
                }
                return Err(KvError::Backend(Box::new(service_error)));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| KvError::Backend(Box::new(e)))?
            .into_bytes();

        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|e| KvError::InvalidValue(e.to_string()))
    }

    pub async fn put(&self, key: &str, value: String) -> Result<(), KvError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .content_type("application/json")
            .body(ByteStream::from(value.into_bytes()))
            .send()
            .await
            .map_err(|e| KvError::Backend(Box::new(e)))?;
        Ok(())
    }
}
