use dashboard_engine::{ApiSettings, EngineConfig, PollSettings};

/// Shell configuration, resolved from the command line and the environment.
///
/// Precedence: `--api-url <url>` beats `DASHBOARD_API_URL` beats the default
/// local gateway.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub verbose: bool,
}

impl AppConfig {
    pub fn from_args<I>(args: I, env_url: Option<String>) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut api_url = env_url.filter(|url| !url.is_empty());
        let mut verbose = false;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => {
                    let url = args
                        .next()
                        .ok_or_else(|| "--api-url requires a value".to_string())?;
                    api_url = Some(url);
                }
                "--verbose" | "-v" => verbose = true,
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(Self {
            api_url: api_url.unwrap_or_else(|| ApiSettings::default().base_url),
            verbose,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api: ApiSettings::for_base_url(self.api_url.clone()),
            poll: PollSettings::default(),
        }
    }
}
