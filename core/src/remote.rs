// storefront_cart/src/remote.rs

//! Stateless client for the server cart endpoints.
//!
//! `RemoteCartClient` is the seam used by the authenticated strategy;
//! `HttpCartClient` is the reqwest implementation talking to
//! `{base}/api/v1/cart`.

use crate::error::{CartError, CartResult, GENERIC_NETWORK_MESSAGE};
use crate::model::{AddCartItemRequest, ApiEnvelope, Cart, MergeCartRequest, MergeItem, UpdateCartItemRequest};
use async_trait::async_trait;
use reqwest::{Client, IntoUrl, Method, RequestBuilder, Url};
use std::time::Duration;
use tracing::{event, instrument, Level};

/// One method per server cart endpoint. Each call takes the bearer credential
/// (if any) and returns the server's cart after the operation.
#[async_trait]
pub trait RemoteCartClient: Send + Sync {
  async fn fetch_cart(&self, token: Option<&str>) -> CartResult<Cart>;

  async fn add_item(
    &self,
    token: Option<&str>,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
  ) -> CartResult<Cart>;

  /// The server removes the line when `quantity` is zero or below.
  async fn update_item(
    &self,
    token: Option<&str>,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
  ) -> CartResult<Cart>;

  async fn remove_item(&self, token: Option<&str>, product_id: &str, variant_id: Option<&str>) -> CartResult<Cart>;

  async fn clear_cart(&self, token: Option<&str>) -> CartResult<Cart>;

  async fn merge_cart(&self, token: Option<&str>, items: &[MergeItem]) -> CartResult<Cart>;
}

#[derive(Debug, Clone)]
pub struct HttpCartClient {
  client: Client,
  cart_url: String,
}

impl HttpCartClient {
  /// `api_base` is the server root, e.g. `http://127.0.0.1:8080`.
  /// Without a timeout the HTTP stack's defaults apply.
  pub fn new(api_base: &str, timeout: Option<Duration>) -> CartResult<Self> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder
      .build()
      .map_err(|e| CartError::Config(format!("HTTP client could not be built: {}", e)))?;
    Ok(Self {
      client,
      cart_url: format!("{}/api/v1/cart", api_base.trim_end_matches('/')),
    })
  }

  pub fn cart_url(&self) -> &str {
    &self.cart_url
  }

  fn request(&self, method: Method, url: impl IntoUrl, token: Option<&str>) -> RequestBuilder {
    let builder = self.client.request(method, url);
    match token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  /// `{cart_url}/items/{product_id}` with the product id percent-encoded as one segment.
  fn item_url(&self, product_id: &str) -> CartResult<Url> {
    let mut url = Url::parse(&self.cart_url).map_err(|e| CartError::Config(format!("Invalid cart URL: {}", e)))?;
    url
      .path_segments_mut()
      .map_err(|_| CartError::Config("Cart URL cannot carry path segments.".to_string()))?
      .extend(&["items", product_id]);
    Ok(url)
  }

  /// Sends the request and unwraps the `{ success, data, error }` envelope.
  async fn send(&self, builder: RequestBuilder) -> CartResult<Cart> {
    let response = builder.send().await.map_err(|e| {
      event!(Level::WARN, error = %e, "Cart request did not reach the server.");
      CartError::Network(e.to_string())
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| CartError::Network(e.to_string()))?;
    let envelope = serde_json::from_str::<ApiEnvelope<Cart>>(&body);

    if !status.is_success() {
      let message = envelope
        .ok()
        .and_then(|env| env.reason().map(str::to_string))
        .unwrap_or_else(|| GENERIC_NETWORK_MESSAGE.to_string());
      event!(Level::WARN, status = status.as_u16(), %message, "Cart request rejected by server.");
      return Err(CartError::Api {
        status: status.as_u16(),
        message,
      });
    }

    let envelope = envelope?;
    if !envelope.success {
      let message = envelope.reason().unwrap_or(GENERIC_NETWORK_MESSAGE).to_string();
      return Err(CartError::Api {
        status: status.as_u16(),
        message,
      });
    }
    envelope
      .data
      .ok_or_else(|| CartError::Decode("Response envelope carried no cart data.".to_string()))
  }
}

#[async_trait]
impl RemoteCartClient for HttpCartClient {
  #[instrument(name = "HttpCartClient::fetch_cart", skip_all, err(Display))]
  async fn fetch_cart(&self, token: Option<&str>) -> CartResult<Cart> {
    self.send(self.request(Method::GET, self.cart_url.as_str(), token)).await
  }

  #[instrument(name = "HttpCartClient::add_item", skip(self, token), err(Display))]
  async fn add_item(
    &self,
    token: Option<&str>,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
  ) -> CartResult<Cart> {
    let body = AddCartItemRequest {
      product_id: product_id.to_string(),
      quantity,
      variant_id: variant_id.map(str::to_string),
    };
    self.send(self.request(Method::POST, format!("{}/items", self.cart_url), token).json(&body)).await
  }

  #[instrument(name = "HttpCartClient::update_item", skip(self, token), err(Display))]
  async fn update_item(
    &self,
    token: Option<&str>,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
  ) -> CartResult<Cart> {
    let body = UpdateCartItemRequest {
      quantity,
      variant_id: variant_id.map(str::to_string),
    };
    let url = self.item_url(product_id)?;
    self.send(self.request(Method::PUT, url, token).json(&body)).await
  }

  #[instrument(name = "HttpCartClient::remove_item", skip(self, token), err(Display))]
  async fn remove_item(&self, token: Option<&str>, product_id: &str, variant_id: Option<&str>) -> CartResult<Cart> {
    let url = self.item_url(product_id)?;
    let mut builder = self.request(Method::DELETE, url, token);
    if let Some(variant_id) = variant_id {
      builder = builder.query(&[("variantId", variant_id)]);
    }
    self.send(builder).await
  }

  #[instrument(name = "HttpCartClient::clear_cart", skip_all, err(Display))]
  async fn clear_cart(&self, token: Option<&str>) -> CartResult<Cart> {
    self.send(self.request(Method::DELETE, self.cart_url.as_str(), token)).await
  }

  #[instrument(name = "HttpCartClient::merge_cart", skip_all, fields(lines = items.len()), err(Display))]
  async fn merge_cart(&self, token: Option<&str>, items: &[MergeItem]) -> CartResult<Cart> {
    let body = MergeCartRequest { items: items.to_vec() };
    self.send(self.request(Method::POST, format!("{}/merge", self.cart_url), token).json(&body)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cart_url_ignores_trailing_slash() {
    let client = HttpCartClient::new("http://shop.local/", None).unwrap();
    assert_eq!(client.cart_url(), "http://shop.local/api/v1/cart");
  }

  #[test]
  fn item_url_encodes_product_id_as_one_segment() {
    let client = HttpCartClient::new("http://shop.local", None).unwrap();
    let url = client.item_url("tee/red blue").unwrap();
    assert_eq!(url.as_str(), "http://shop.local/api/v1/cart/items/tee%2Fred%20blue");
  }
}
