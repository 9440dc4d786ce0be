/// REST calls to the card API
///
/// Every call is a single request with no retry or backoff. Callers decide
/// how a failure shows up (inline error text on the board, a log line in
/// the editor).

use gloo_net::http::Request;

use crate::card::{Board, BoardDetail, Card, NewCard};
use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiClient {
    config: Config,
}

impl ApiClient {
    pub fn new(config: Config) -> Self {
        ApiClient { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch all boards from `GET /boards`.
    pub async fn fetch_boards(&self) -> Result<Vec<Board>> {
        let url = self.config.boards_url()?;
        let resp = Request::get(url.as_str()).send().await?;
        if !resp.ok() {
            return Err(Error::Status(resp.status()));
        }
        Ok(resp.json::<Vec<Board>>().await?)
    }

    /// Fetch the cards of one board from `GET /boards/{name}`.
    pub async fn fetch_board(&self, name: &str) -> Result<Vec<Card>> {
        let url = self.config.board_url(name)?;
        let resp = Request::get(url.as_str()).send().await?;
        if !resp.ok() {
            return Err(Error::Status(resp.status()));
        }
        let detail = resp.json::<BoardDetail>().await?;
        Ok(detail.into_cards())
    }

    /// Create a card with `POST /cards`. Any 2xx counts as success.
    pub async fn create_card(&self, card: &NewCard) -> Result<()> {
        let url = self.config.cards_url()?;
        let resp = Request::post(url.as_str()).json(card)?.send().await?;
        if !resp.ok() {
            return Err(Error::Status(resp.status()));
        }
        log::info!("Card saved to board {:?}", card.board_name);
        Ok(())
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        ApiClient::new(Config::load())
    }
}
