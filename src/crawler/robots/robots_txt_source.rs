use reqwest::StatusCode;
use robots_txt::Robots;
use robots_txt::matcher::SimpleMatcher;
use url::Url;

#[derive(Clone, Debug)]
pub struct RobotsTxtSource {
    content: String,
    agent: String,
}

impl RobotsTxtSource {
    pub fn new(content: impl Into<String>, agent: &str) -> Self {
        Self {
            content: content.into(),
            agent: agent.to_owned(),
        }
    }

    /// Fetches `/robots.txt` of the URL's origin. A missing file allows everything.
    pub async fn load_from_url(client: &reqwest::Client, url: &Url, agent: &str) -> anyhow::Result<Self> {
        let mut robots_txt_url = url.clone();
        robots_txt_url.set_path("/robots.txt");
        robots_txt_url.set_query(None);
        let robots_response = client.get(robots_txt_url).send().await?;
        if !robots_response.status().is_success() {
            if robots_response.status() == StatusCode::NOT_FOUND {
                return Ok(Self::new(String::new(), agent));
            }
            return Err(anyhow::anyhow!(
                "robots.txt for {} returned {}",
                url,
                robots_response.status()
            ));
        }
        let content = robots_response.text().await?;
        Ok(Self::new(content, agent))
    }

    /// Parses the file once; the result borrows from this source.
    pub fn rules(&self) -> RobotsTxtRules<'_> {
        RobotsTxtRules {
            robots: Robots::from_str_lossy(self.content.as_str()),
            agent: self.agent.as_str(),
        }
    }
}

/// Parsed robots.txt, checked against the section chosen for our agent.
pub struct RobotsTxtRules<'a> {
    robots: Robots<'a>,
    agent: &'a str,
}

impl RobotsTxtRules<'_> {
    pub fn allows(&self, path: &str) -> bool {
        let section = self.robots.choose_section(self.agent);
        SimpleMatcher::new(&section.rules).check_path(path)
    }
}
