//! S3 对象存储客户端

use super::ObjectStore;
use crate::errors::AppError;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

/// S3 对象存储
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                if err.as_service_error().map(|e| e.is_no_such_key()).unwrap_or(false) {
                    return Ok(None);
                }
                return Err(AppError::StorageReadError(format!(
                    "读取 s3://{}/{} 失败: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&err)
                )));
            }
        };

        let bytes = output.body.collect().await.map_err(|e| {
            AppError::StorageReadError(format!("读取 s3://{}/{} 内容失败: {}", bucket, key, e))
        })?;

        Ok(Some(bytes.into_bytes().to_vec()))
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                AppError::StorageWriteError(format!(
                    "写入 s3://{}/{} 失败: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }

    async fn count(&self, bucket: &str, prefix: &str, max_keys: i32) -> Result<usize, AppError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| {
                AppError::StorageReadError(format!(
                    "列举 s3://{}/{} 失败: {}",
                    bucket,
                    prefix,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output.key_count().unwrap_or(0).max(0) as usize)
    }
}
