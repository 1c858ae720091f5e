//! Expression source backed by the remote gene service.

use formats::{BoxFuture, Column, ExpressionSource, SourceError, inflate, parse_column, parse_gene_values};
use state::ApiState;
use tracing::{debug, warn};

const COLUMN_PATH: &str = "get-gz-file";
const VALUES_PATH: &str = "get-gene-values";

pub struct HttpSource {
    base_url: String,
    dbname: String,
    username: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(api: &ApiState) -> Self {
        Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            dbname: api.dbname.clone(),
            username: api.username.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Query parameters shared by both endpoints.
    fn params(&self, column: &str, prefix: &str) -> [(&'static str, String); 5] {
        [
            ("gene", column.to_string()),
            ("dbname", self.dbname.clone()),
            ("dbcollection", prefix.to_string()),
            ("username", self.username.clone()),
            ("csv_filename", format!("{prefix}_matrix.csv")),
        ]
    }

    async fn get(&self, path: &str, column: &str, prefix: &str) -> Result<reqwest::Response, SourceError> {
        let url = self.endpoint(path);
        debug!(%url, column, prefix, "fetch");
        let resp = self
            .client
            .get(&url)
            .query(&self.params(column, prefix))
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound {
                column: column.to_string(),
                prefix: prefix.to_string(),
            });
        }
        if !resp.status().is_success() {
            warn!(status = %resp.status(), column, "fetch failed");
            return Err(SourceError::Http {
                status: resp.status().as_u16(),
                column: column.to_string(),
            });
        }
        Ok(resp)
    }
}

impl ExpressionSource for HttpSource {
    fn fetch_column<'a>(
        &'a self,
        column: &'a str,
        prefix: &'a str,
    ) -> BoxFuture<'a, Result<Column, SourceError>> {
        Box::pin(async move {
            let resp = self.get(COLUMN_PATH, column, prefix).await?;
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| SourceError::Transport(e.to_string()))?;
            let text = inflate(&bytes)?;
            Ok(parse_column(&text))
        })
    }

    fn fetch_values<'a>(
        &'a self,
        column: &'a str,
        prefix: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, SourceError>> {
        Box::pin(async move {
            let resp = self.get(VALUES_PATH, column, prefix).await?;
            let text = resp
                .text()
                .await
                .map_err(|e| SourceError::Transport(e.to_string()))?;
            Ok(parse_gene_values(&text, column)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_parameters_name_the_matrix_file() {
        let mut api = ApiState::new("ob");
        api.base_url = "http://localhost:8080/".into();
        let source = HttpSource::new(&api);
        assert_eq!(source.endpoint(COLUMN_PATH), "http://localhost:8080/get-gz-file");
        let params = source.params("Gad1", "ob");
        assert_eq!(params[0], ("gene", "Gad1".to_string()));
        assert_eq!(params[2], ("dbcollection", "ob".to_string()));
        assert_eq!(params[4], ("csv_filename", "ob_matrix.csv".to_string()));
    }
}
