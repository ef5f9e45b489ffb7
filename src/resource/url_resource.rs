use std::io::{Cursor, Read};

use reqwest::Url;

use super::core::{Resource, ResourceError};

/// http(s) URL 资源
///
/// 内容在 `open` 时通过阻塞 HTTP 客户端一次性拉取，没有重试和超时
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlResource {
    url: String,
}

impl UrlResource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn http_error(&self, message: impl ToString) -> ResourceError {
        ResourceError::Http {
            url: self.url.clone(),
            message: message.to_string(),
        }
    }
}

impl Resource for UrlResource {
    fn description(&self) -> String {
        format!("URL [{}]", self.url)
    }

    fn exists(&self) -> bool {
        reqwest::blocking::Client::new()
            .head(&self.url)
            .send()
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    fn open(&self) -> Result<Box<dyn Read + Send>, ResourceError> {
        let response = reqwest::blocking::get(&self.url)
            .and_then(|response| response.error_for_status())
            .map_err(|e| self.http_error(e))?;
        let body = response.bytes().map_err(|e| self.http_error(e))?;
        Ok(Box::new(Cursor::new(body.to_vec())))
    }

    fn create_relative(&self, relative_path: &str) -> Result<Box<dyn Resource>, ResourceError> {
        let base = Url::parse(&self.url).map_err(|e| ResourceError::resolution(&self.url, e))?;
        let joined = base
            .join(relative_path)
            .map_err(|e| ResourceError::resolution(relative_path, e))?;
        Ok(Box::new(UrlResource::new(joined.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_open_fetches_body() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/conf/beans.xml")
            .with_status(200)
            .with_body("<beans/>")
            .create();

        let resource = UrlResource::new(format!("{}/conf/beans.xml", server.url()));
        let mut content = String::new();
        resource.open()?.read_to_string(&mut content)?;

        assert_eq!(content, "<beans/>");
        mock.assert();
        Ok(())
    }

    #[test]
    fn test_error_status_is_http_error() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/missing.xml").with_status(404).create();

        let resource = UrlResource::new(format!("{}/missing.xml", server.url()));
        assert!(matches!(resource.open(), Err(ResourceError::Http { .. })));
    }

    #[test]
    fn test_create_relative() -> Result<()> {
        let resource = UrlResource::new("http://localhost:8080/conf/beans.xml");
        let relative = resource.create_relative("common.xml")?;
        assert_eq!(relative.description(), "URL [http://localhost:8080/conf/common.xml]");
        Ok(())
    }
}
