use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};

use crate::client::Client;
use crate::config::ApiConfig;
use crate::error::{Error, RemoteError, XmlError};
use crate::types::*;

pub struct BggApiClient {
    client: reqwest::Client,
    base_url: String,
    retries: usize,
}

impl BggApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/xml"));

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .user_agent(concat!("playlog/", env!("CARGO_PKG_VERSION")))
                .timeout(config.timeout())
                .build()?,
            base_url: config.base_url.trim_end_matches('/').into(),
            retries: config.retries,
        })
    }

    async fn get_xml<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(%url, ?query, "requesting BGG");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!(%url, %status, "fetching failed");
            return Err(RemoteError::new(&url, status).into());
        }

        let body = response.text().await?;
        quick_xml::de::from_str(&body).map_err(|e| XmlError::new(&url, e).into())
    }

    async fn plays(&self, username: &str) -> Result<Plays, Error> {
        self.get_xml("plays", &[("username", username.to_string())])
            .await
    }

    async fn thing(&self, game_id: u64) -> Result<Things, Error> {
        self.get_xml("thing", &[("id", game_id.to_string())]).await
    }

    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(20)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.retries)
    }
}

fn should_retry(e: &Error) -> bool {
    let transient = e.is_transient();
    if transient {
        tracing::warn!(error = %e, "transient BGG failure, retrying");
    }
    transient
}

#[async_trait]
impl Client for BggApiClient {
    #[tracing::instrument(name = "Fetch plays", skip(self))]
    async fn fetch_plays(&self, username: &str) -> Result<Vec<PlayRecord>, Error> {
        tracing::info!("fetching data from the BGG API");
        let plays =
            RetryIf::spawn(self.retry_strategy(), || self.plays(username), should_retry).await?;

        let records = plays
            .plays
            .iter()
            .cloned()
            .map(PlayRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        for record in &records {
            tracing::debug!(?record, "play parsed");
        }
        tracing::info!(user = %plays.username, count = records.len(), "data fetched");

        Ok(records)
    }

    #[tracing::instrument(name = "Fetch thumbnail", skip(self))]
    async fn fetch_thumbnail(&self, game_id: u64) -> Result<Option<String>, Error> {
        let things =
            RetryIf::spawn(self.retry_strategy(), || self.thing(game_id), should_retry).await?;

        let Some(thing) = things.items.into_iter().next() else {
            tracing::warn!("BGG returned no item");
            return Ok(None);
        };
        if thing.thumbnail.is_none() {
            tracing::debug!(id = thing.id, "game has no thumbnail");
        }

        Ok(thing.thumbnail.map(|url| url.trim().to_string()))
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use mockito::Matcher;

    use crate::api_client::BggApiClient;
    use crate::client::Client;
    use crate::config::ApiConfig;
    use crate::error::Error;
    use crate::types::PlayRecord;

    fn client(server: &mockito::ServerGuard) -> BggApiClient {
        BggApiClient::new(&ApiConfig {
            base_url: server.url(),
            retries: 2,
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_plays() {
        let mut server = mockito::Server::new_async().await;
        let client = client(&server);

        let xml = r###"<?xml version="1.0" encoding="utf-8"?>
            <plays username="meeple" userid="42" total="2" page="1" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
              <play id="801" date="2024-03-02" quantity="1" length="60" incomplete="0" nowinstats="0" location="Home">
                <item name="Pandemic" objecttype="thing" objectid="30549">
                  <subtypes>
                    <subtype value="boardgame" />
                  </subtypes>
                </item>
                <comments>Won on the last turn</comments>
                <players>
                  <player username="meeple" name="Mia" score="" new="0" win="1" />
                </players>
              </play>
              <play id="800" date="2024-03-01" quantity="1" length="" incomplete="0" nowinstats="0" location="">
                <item name="Azul" objecttype="thing" objectid="230802">
                  <subtypes>
                    <subtype value="boardgame" />
                  </subtypes>
                </item>
              </play>
            </plays>
        "###;

        let mock = server
            .mock("GET", "/plays")
            .match_query(Matcher::UrlEncoded("username".into(), "meeple".into()))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(xml)
            .create_async()
            .await;

        let plays = client.fetch_plays("meeple").await.unwrap();
        mock.assert();

        assert_eq!(
            plays,
            vec![
                PlayRecord {
                    date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                    game_id: 30549,
                    game_name: "Pandemic".into(),
                    comment: Some("Won on the last turn".into()),
                    length: 60,
                },
                PlayRecord {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    game_id: 230802,
                    game_name: "Azul".into(),
                    comment: None,
                    length: 0,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_plays_without_any_plays() {
        let mut server = mockito::Server::new_async().await;
        let client = client(&server);

        let mock = server
            .mock("GET", "/plays")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"<plays username="nobody" userid="7" total="0" page="1"/>"#)
            .create_async()
            .await;

        assert!(client.fetch_plays("nobody").await.unwrap().is_empty());
        mock.assert();
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let client = client(&server);

        let mock = server
            .mock("GET", "/plays")
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let err = client.fetch_plays("meeple").await.unwrap_err();
        mock.assert();

        match err {
            Error::Remote(e) => assert_eq!(e.status(), reqwest::StatusCode::NOT_FOUND),
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retried_then_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let client = client(&server);

        // first attempt plus two retries
        let mock = server
            .mock("GET", "/plays")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let err = client.fetch_plays("meeple").await.unwrap_err();
        mock.assert();
        assert!(err.is_remote());
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        let client = client(&server);

        let mock = server
            .mock("GET", "/plays")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"<plays><play id="1" date="2024-03-01" length="10"></play></plays>"#)
            .create_async()
            .await;

        let err = client.fetch_plays("meeple").await.unwrap_err();
        mock.assert();
        assert!(matches!(err, Error::InvalidPlay(_)));

        let mock = server
            .mock("GET", "/thing")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<items><item id=")
            .create_async()
            .await;

        let err = client.fetch_thumbnail(1).await.unwrap_err();
        mock.assert();
        assert!(matches!(err, Error::Xml(_)));
    }

    #[tokio::test]
    async fn test_fetch_thumbnail() {
        let mut server = mockito::Server::new_async().await;
        let client = client(&server);

        let xml = r###"<?xml version="1.0" encoding="utf-8"?>
            <items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
              <item type="boardgame" id="30549">
                <thumbnail>https://cf.geekdo-images.com/pandemic_t.jpg</thumbnail>
                <image>https://cf.geekdo-images.com/pandemic.jpg</image>
                <name type="primary" sortindex="1" value="Pandemic" />
                <name type="alternate" sortindex="1" value="Pandemia" />
                <yearpublished value="2008" />
              </item>
            </items>
        "###;

        let mock = server
            .mock("GET", "/thing")
            .match_query(Matcher::UrlEncoded("id".into(), "30549".into()))
            .with_status(200)
            .with_body(xml)
            .create_async()
            .await;

        assert_eq!(
            client.fetch_thumbnail(30549).await.unwrap().as_deref(),
            Some("https://cf.geekdo-images.com/pandemic_t.jpg")
        );
        mock.assert();

        let mock = server
            .mock("GET", "/thing")
            .match_query(Matcher::UrlEncoded("id".into(), "1".into()))
            .with_status(200)
            .with_body(r#"<items><item type="boardgame" id="1"></item></items>"#)
            .create_async()
            .await;

        assert_eq!(client.fetch_thumbnail(1).await.unwrap(), None);
        mock.assert();
    }
}
