use std::collections::{BTreeMap, HashMap};
use std::env;

/// Read-only view of environment variables.
///
/// The resolver never touches `std::env` directly, so tests can hand it a map.
pub trait EnvLookup {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cli,
    Env(&'static str),
    Default,
}

/// A named setting and the places it may be supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub name: &'static str,
    pub flag: &'static str,
    pub env: Option<&'static str>,
}

impl Setting {
    /// Ordered lookup sources: the CLI value first, then the env var
    pub fn sources<'a>(&self, cli: Option<&'a str>) -> Vec<Source<'a>> {
        let mut sources = vec![Source::Cli(cli)];
        if let Some(var) = self.env {
            sources.push(Source::Env(var));
        }
        sources
    }

    /// How to supply this setting, for error messages
    pub fn hint(&self) -> String {
        match self.env {
            Some(var) => format!("pass {} or set {}", self.flag, var),
            None => format!("pass {}", self.flag),
        }
    }
}

pub const TASKDEF: Setting = Setting {
    name: "taskdef",
    flag: "--taskdef",
    env: None,
};

pub const BALROG_API_ROOT: Setting = Setting {
    name: "api_root",
    flag: "--balrog-api-root",
    env: Some("BALROG_API_ROOT"),
};

pub const BALROG_USERNAME: Setting = Setting {
    name: "balrog_username",
    flag: "--balrog-username",
    env: Some("BALROG_USERNAME"),
};

pub const BALROG_PASSWORD: Setting = Setting {
    name: "balrog_password",
    flag: "--balrog-password",
    env: Some("BALROG_PASSWORD"),
};

pub const S3_BUCKET: Setting = Setting {
    name: "s3_bucket",
    flag: "--s3-bucket",
    env: Some("S3_BUCKET"),
};

pub const AWS_KEY_ID: Setting = Setting {
    name: "aws_key_id",
    flag: "--aws-access-key-id",
    env: Some("AWS_ACCESS_KEY_ID"),
};

pub const AWS_KEY_SECRET: Setting = Setting {
    name: "aws_key_secret",
    flag: "--aws-secret-access-key",
    env: Some("AWS_SECRET_ACCESS_KEY"),
};

/// One place a value can be looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source<'a> {
    Cli(Option<&'a str>),
    Env(&'static str),
    Default(&'static str),
}

/// A value together with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub origin: Origin,
}

/// Return the first value among `sources`, in order.
///
/// A flag given on the command line wins even when empty. Empty env and
/// default values count as unset so that `S3_BUCKET=` does not shadow a default.
pub fn resolve_layered(sources: &[Source<'_>], env: &dyn EnvLookup) -> Option<Resolved> {
    sources.iter().find_map(|source| {
        let (value, origin) = match *source {
            Source::Cli(value) => (value.map(str::to_string), Origin::Cli),
            Source::Env(var) => (env.get(var), Origin::Env(var)),
            Source::Default(value) => (Some(value.to_string()), Origin::Default),
        };
        let explicit = matches!(source, Source::Cli(_));
        value
            .filter(|v| explicit || !v.is_empty())
            .map(|value| Resolved { value, origin })
    })
}

/// Layered lookups against one environment, remembering each origin
pub struct Layered<'e> {
    env: &'e dyn EnvLookup,
    origins: BTreeMap<&'static str, Origin>,
}

impl<'e> Layered<'e> {
    pub fn new(env: &'e dyn EnvLookup) -> Self {
        Self {
            env,
            origins: BTreeMap::new(),
        }
    }

    pub fn lookup(&mut self, setting: &Setting, cli: Option<&str>) -> Option<String> {
        let resolved = resolve_layered(&setting.sources(cli), self.env)?;
        tracing::debug!(setting = setting.name, origin = ?resolved.origin, "Resolved setting");
        self.origins.insert(setting.name, resolved.origin);
        Some(resolved.value)
    }

    /// Record a setting that has no lookup chain, such as a boolean flag
    pub fn record(&mut self, name: &'static str, origin: Origin) {
        self.origins.insert(name, origin);
    }

    pub fn into_origins(self) -> BTreeMap<&'static str, Origin> {
        self.origins
    }
}
