/// Any type that can provide a bearer auth token.
pub trait AuthTokenProvider: Clone {
    fn resolve(&self) -> Option<String>;
}

/// Auth token provided that takes the auth token from the environment variable `OPENAI_API_KEY`.
#[derive(Clone)]
pub struct EnvironmentAuthTokenProvider;

impl EnvironmentAuthTokenProvider {
    const ENV_VAR: &'static str = "OPENAI_API_KEY";
}

impl AuthTokenProvider for EnvironmentAuthTokenProvider {
    fn resolve(&self) -> Option<String> {
        std::env::var(Self::ENV_VAR).ok()
    }
}

/// Auth token provider holding a fixed API key. An empty key resolves to nothing.
#[derive(Clone)]
pub struct StaticAuthTokenProvider(String);

impl StaticAuthTokenProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self(api_key.into())
    }
}

impl AuthTokenProvider for StaticAuthTokenProvider {
    fn resolve(&self) -> Option<String> {
        (!self.0.is_empty()).then(|| self.0.clone())
    }
}
