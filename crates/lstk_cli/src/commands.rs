use std::io;
use std::sync::Arc;

use anyhow::Context as _;
use container_runtime::{DockerRuntime, Runtime};
use credential_store::{BackendPreference, CredentialStore};
use lstk::auth::{Auth, AuthError, AuthOptions};
use lstk::config::{Config, ConfigError, ConfigLocations, LoadedConfig};
use lstk::container::{self, StartError, StartPipeline};
use lstk::env::EnvConfig;
use lstk::output::{PlainSink, Sink};
use platform_api::{PlatformApi, PlatformApiConfig, PlatformClient};
use tokio_util::sync::CancellationToken;

use crate::cli::{Command, ConfigCommand};
use crate::ui;
use crate::version::{long_version, VERSION};

/// Everything a command needs, resolved once from the environment and config file.
pub struct Context {
    pub env: EnvConfig,
    pub locations: ConfigLocations,
    pub interactive: bool,
    pub cancel: CancellationToken,
}

impl Context {
    fn load_config(&self) -> anyhow::Result<LoadedConfig> {
        Ok(Config::load_or_create(&self.locations)?)
    }

    fn platform(&self) -> anyhow::Result<Arc<dyn PlatformApi>> {
        let config = PlatformApiConfig::new(&self.env.api_endpoint)
            .with_user_agent(format!("lstk/{VERSION}"));
        let client = PlatformClient::new(config).context("creating platform API client")?;
        Ok(Arc::new(client))
    }

    fn store(&self, config: &LoadedConfig) -> anyhow::Result<CredentialStore> {
        let preference = BackendPreference::from_setting(self.env.keyring.as_deref());
        CredentialStore::open(&config.dir(), preference).context("opening credential store")
    }

    fn auth(&self, config: &LoadedConfig, sink: Arc<dyn Sink>) -> anyhow::Result<Auth> {
        Ok(Auth::new(
            self.store(config)?,
            self.platform()?,
            sink,
            self.auth_options(),
        ))
    }

    fn auth_options(&self) -> AuthOptions {
        AuthOptions::new(&self.env.web_app_url)
            .with_env_token(self.env.auth_token.clone())
            .with_interactive(self.interactive)
    }
}

fn runtime() -> anyhow::Result<Arc<dyn Runtime>> {
    let runtime = DockerRuntime::connect().context("connecting to Docker")?;
    Ok(Arc::new(runtime))
}

fn plain_sink() -> Arc<dyn Sink> {
    Arc::new(PlainSink::new(io::stdout()))
}

/// Whether `error` is a user abort rather than a failure.
pub fn is_cancelled(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<AuthError>()
            .is_some_and(AuthError::is_cancelled)
            || cause
                .downcast_ref::<StartError>()
                .is_some_and(StartError::is_cancelled)
    })
}

pub async fn execute(command: Command, ctx: Context) -> anyhow::Result<()> {
    match command {
        Command::Start => start(ctx).await,
        Command::Login => login(ctx).await,
        Command::Logout => logout(ctx).await,
        Command::Stop => stop(ctx).await,
        Command::Logs { follow } => logs(ctx, follow).await,
        Command::Config {
            command: ConfigCommand::Path,
        } => config_path(&ctx),
        Command::Version => {
            println!("lstk {}", long_version());
            Ok(())
        }
    }
}

/// Runs `task` behind the inline UI when interactive, else against a line sink.
async fn with_sink<F, Fut>(ctx: &Context, task: F) -> anyhow::Result<()>
where
    F: FnOnce(Arc<dyn Sink>) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    if ctx.interactive {
        ui::run(VERSION, ctx.cancel.clone(), is_cancelled, task).await
    } else {
        task(plain_sink()).await
    }
}

async fn start(ctx: Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let specs = config.config.resolve_specs()?;
    let platform = ctx.platform()?;
    let runtime = runtime()?;
    let store = ctx.store(&config)?;
    let options = ctx.auth_options();
    let cancel = ctx.cancel.clone();
    let config_path = config.path.clone();

    with_sink(&ctx, move |sink| async move {
        let auth = Auth::new(store, Arc::clone(&platform), Arc::clone(&sink), options);
        let token = auth.get_token(&cancel).await?;
        StartPipeline::new(runtime, platform, sink)
            .with_config_path(config_path)
            .start(&cancel, &token, specs)
            .await?;
        Ok(())
    })
    .await
}

async fn login(ctx: Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.store(&config)?;
    let platform = ctx.platform()?;
    let options = ctx.auth_options();
    let cancel = ctx.cancel.clone();

    with_sink(&ctx, move |sink| async move {
        Auth::new(store, platform, sink, options)
            .get_token(&cancel)
            .await?;
        Ok(())
    })
    .await
}

async fn logout(ctx: Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    ctx.auth(&config, plain_sink())?.logout()?;
    Ok(())
}

async fn stop(ctx: Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let names = container_names(&config)?;
    let runtime = runtime()?;
    container::stop(runtime.as_ref(), plain_sink().as_ref(), &names).await?;
    Ok(())
}

async fn logs(ctx: Context, follow: bool) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let names = container_names(&config)?;
    let runtime = runtime()?;
    let sink = plain_sink();
    container::logs(runtime.as_ref(), sink.as_ref(), &names[0], follow, &ctx.cancel).await?;
    Ok(())
}

fn config_path(ctx: &Context) -> anyhow::Result<()> {
    let path = ctx
        .locations
        .resolve_path()
        .context("resolving config path")?
        .ok_or(ConfigError::NoConfigDir)?;
    println!("{}", path.display());
    Ok(())
}

fn container_names(config: &LoadedConfig) -> anyhow::Result<Vec<String>> {
    let names: Vec<String> = config
        .config
        .containers
        .iter()
        .map(|container| container.name())
        .collect();
    if names.is_empty() {
        return Err(ConfigError::NoContainers {
            path: config.path.clone(),
        }
        .into());
    }
    Ok(names)
}
