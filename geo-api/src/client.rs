use std::time::Duration;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use url::Url;
use crate::Error;

pub const DEFAULT_HOST: &str = "ip-api.com";

#[derive(Clone)]
pub struct Client {
    pub(crate) client: reqwest::Client,
    pub(crate) urls:   Urls,
}

impl Client {
    pub fn new(host: Option<&str>) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client: client,
            urls:   Urls::new(host)?,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let res = self.client.get(url).send().await?;
        let status = res.status();
        match status {
            _ if status.is_success()        => Ok(res.json().await?),
            StatusCode::TOO_MANY_REQUESTS   => Err(Error::Limited),
            _                               => Err(error(res).await),
        }
    }
}

async fn error(res: reqwest::Response) -> Error {
    let status = res.status();

    #[derive(Deserialize)]
    struct Wrapper {
        message: String,
    }

    match res.json::<Wrapper>().await {
        Ok(w)  => Error::App(w.message, status.into()),
        Err(_) => Error::Status(status.into()),
    }
}

#[derive(Clone, Debug)]
pub struct Urls {
    pub json: Url,
}

impl Urls {
    fn new(host: Option<&str>) -> Result<Self, Error> {
        let host = host.unwrap_or(DEFAULT_HOST);

        let base = match host {
            _ if host.starts_with("http://")  => host.to_owned(),
            _ if host.starts_with("https://") => host.to_owned(),
            _                                 => format!("http://{}", host),
        };

        let base = base.trim_end_matches('/');

        Ok(Self {
            json: Url::parse(&format!("{}/json/", base))?,
        })
    }
}
