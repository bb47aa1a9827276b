//! PDF 来源列表服务 - 业务能力层
//!
//! 读取 pdfs.txt，并把其中的 URL 或本地路径解析成可上传的本地文件

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{AppError, AppResult, FileError};
use crate::services::staging::validate_file_name;

/// 读取来源列表，跳过空行和 `#` 开头的注释
pub async fn load_sources(list_file: &Path) -> AppResult<Vec<String>> {
    if !list_file.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: list_file.display().to_string(),
        }));
    }

    let content = tokio::fs::read_to_string(list_file)
        .await
        .map_err(|e| AppError::file_read_failed(list_file.display().to_string(), e))?;

    Ok(parse_sources(&content))
}

fn parse_sources(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 把来源解析为本地文件的绝对路径
///
/// - `http` 开头：下载到 `download_dir`，文件名取 URL 最后一段
/// - 其他：视为本地路径
///
/// 下载返回非 200 或本地文件不存在时返回 `Ok(None)`
pub async fn resolve_source(source: &str, download_dir: &Path) -> AppResult<Option<PathBuf>> {
    if source.starts_with("http") {
        download_file(source, download_dir).await
    } else {
        let path = Path::new(source);
        if path.exists() {
            let absolute = tokio::fs::canonicalize(path)
                .await
                .map_err(|e| AppError::file_read_failed(source, e))?;
            Ok(Some(absolute))
        } else {
            warn!("文件不存在: {}", source);
            Ok(None)
        }
    }
}

async fn download_file(url: &str, download_dir: &Path) -> AppResult<Option<PathBuf>> {
    let file_name = validate_file_name(url.rsplit('/').next().unwrap_or_default())?;
    info!("⬇️ 正在下载 {} ...", file_name);

    let response = reqwest::get(url)
        .await
        .map_err(|e| AppError::download_failed(url, e))?;

    if response.status() != reqwest::StatusCode::OK {
        warn!("下载失败 {}: HTTP {}", url, response.status());
        return Ok(None);
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::download_failed(url, e))?;

    tokio::fs::create_dir_all(download_dir)
        .await
        .map_err(|e| AppError::file_write_failed(download_dir.display().to_string(), e))?;

    let path = download_dir.join(file_name);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    let absolute = tokio::fs::canonicalize(&path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    Ok(Some(absolute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_sources_skips_comments() {
        let content = "# header\nhttps://example.com/a.pdf\n\n  local.pdf  \n#skip.pdf\n";
        assert_eq!(
            parse_sources(content),
            vec!["https://example.com/a.pdf".to_string(), "local.pdf".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = tokio_test::assert_err!(load_sources(&dir.path().join("pdfs.txt")).await);
        assert!(matches!(err, AppError::File(FileError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        std::fs::write(&file, b"pdf").unwrap();

        let resolved = resolve_source(file.to_str().unwrap(), dir.path()).await.unwrap();
        assert_eq!(resolved, Some(std::fs::canonicalize(&file).unwrap()));

        let missing = dir.path().join("missing.pdf");
        let resolved = resolve_source(missing.to_str().unwrap(), dir.path()).await.unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn test_download_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/a.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = format!("{}/files/a.pdf", server.uri());
        let resolved = tokio_test::assert_ok!(resolve_source(&url, dir.path()).await).unwrap();

        assert!(resolved.ends_with("a.pdf"));
        assert_eq!(std::fs::read(resolved).unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn test_download_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = format!("{}/files/b.pdf", server.uri());
        assert_eq!(resolve_source(&url, dir.path()).await.unwrap(), None);
        assert!(!dir.path().join("b.pdf").exists());
    }
}
