// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client for the expenses REST API.

use crate::error::{Error, Result};
use crate::models::ExpenseSummary;
use crate::period::DateRange;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::json;

const UA: &str = concat!(
    "spendlens/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/spendlens)"
);

pub fn http_client() -> Result<Client> {
    let c = Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

/// The calls the dashboards make against the expenses service.
pub trait ExpenseApi {
    /// `GET /api/expenses/summary?startDate&endDate`
    fn fetch_summary(&self, range: &DateRange) -> Result<ExpenseSummary>;
    /// Move a whole expense to another category.
    fn update_expense_category(&self, expense_id: &str, category: &str) -> Result<()>;
    /// Move one line item, by index, to another category.
    fn update_item_category(&self, expense_id: &str, item_index: usize, category: &str)
    -> Result<()>;
}

pub struct HttpExpenseApi {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl HttpExpenseApi {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = base_url.trim().to_string();
        Url::parse(&base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            base_url,
            token,
            client: http_client()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::InvalidUrl(self.base_url.clone()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn send(&self, req: RequestBuilder) -> Result<Response> {
        let req = match self.token {
            Some(ref t) => req.bearer_auth(t),
            None => req,
        };
        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: if message.trim().is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }
        Ok(resp)
    }

    pub fn delete_expense(&self, expense_id: &str) -> Result<()> {
        let url = self.endpoint(&["api", "expenses", expense_id])?;
        tracing::debug!(%url, "DELETE expense");
        self.send(self.client.delete(url))?;
        Ok(())
    }

    pub fn delete_item(&self, expense_id: &str, item_index: usize) -> Result<()> {
        let index = item_index.to_string();
        let url = self.endpoint(&["api", "expenses", expense_id, "items", &index])?;
        tracing::debug!(%url, "DELETE line item");
        self.send(self.client.delete(url))?;
        Ok(())
    }
}

impl ExpenseApi for HttpExpenseApi {
    fn fetch_summary(&self, range: &DateRange) -> Result<ExpenseSummary> {
        let url = self.endpoint(&["api", "expenses", "summary"])?;
        tracing::debug!(%url, %range, "GET expense summary");
        let resp = self.send(
            self.client
                .get(url)
                .query(&[("startDate", range.start_key()), ("endDate", range.end_key())]),
        )?;
        Ok(resp.json()?)
    }

    fn update_expense_category(&self, expense_id: &str, category: &str) -> Result<()> {
        let url = self.endpoint(&["api", "expenses", expense_id, "category"])?;
        tracing::debug!(%url, %category, "PUT expense category");
        self.send(self.client.put(url).json(&json!({ "category": category })))?;
        Ok(())
    }

    fn update_item_category(
        &self,
        expense_id: &str,
        item_index: usize,
        category: &str,
    ) -> Result<()> {
        let index = item_index.to_string();
        let url = self.endpoint(&["api", "expenses", expense_id, "items", &index, "category"])?;
        tracing::debug!(%url, %category, "PUT item category");
        self.send(self.client.put(url).json(&json!({ "category": category })))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_escapes_ids_and_keeps_base_path() {
        let api = HttpExpenseApi::new("http://localhost:5000/v1/", None).unwrap();
        let url = api.endpoint(&["api", "expenses", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/v1/api/expenses/a%20b%2Fc");
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(HttpExpenseApi::new("not a url", None).is_err());
    }
}
