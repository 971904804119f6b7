use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use stockx_oauth_helper::{
    ApiExample, BrowserNavigator, CallbackParams, Credentials, DEFAULT_HOST, DEFAULT_PORT,
    ExchangeRequest, HelperError, HelperServer, LocalServerConfig, Navigator, ProviderConfig,
    TokenExchanger, authorization_request, start_authorization,
};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Parser)]
#[command(
    name = "stockx-oauth-helper",
    about = "Walk through the StockX OAuth flow and print a bearer token plus an example API request."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    provider: ProviderArgs,

    // Used when no subcommand is given.
    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the helper page and open it in a browser (default).
    Serve(ServeArgs),
    /// Print the authorization URL without starting the helper page.
    AuthorizeUrl(AuthorizeUrlArgs),
    /// Exchange an authorization code and print the token response as JSON.
    Exchange(ExchangeArgs),
}

#[derive(Debug, Args)]
struct ProviderArgs {
    #[arg(long, env = "STOCKX_AUTHORIZE_URL", global = true)]
    authorize_url: Option<String>,

    #[arg(long, env = "STOCKX_TOKEN_URL", global = true)]
    token_url: Option<String>,

    #[arg(long, env = "STOCKX_AUDIENCE", global = true)]
    audience: Option<String>,

    /// Give up on the token endpoint after this many seconds. No limit by default.
    #[arg(long, env = "STOCKX_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,
}

impl ProviderArgs {
    fn provider(&self) -> ProviderConfig {
        let mut provider = ProviderConfig::stockx();
        if let Some(url) = &self.authorize_url {
            provider = provider.with_authorize_url(url);
        }
        if let Some(url) = &self.token_url {
            provider = provider.with_token_url(url);
        }
        if let Some(audience) = &self.audience {
            provider = provider.with_audience(audience);
        }
        provider
    }

    fn exchanger(&self) -> Result<TokenExchanger, HelperError> {
        TokenExchanger::with_timeout(self.provider(), self.timeout_secs.map(Duration::from_secs))
    }
}

#[derive(Debug, Args)]
struct ServeArgs {
    #[arg(long, env = "STOCKX_HELPER_HOST", default_value = DEFAULT_HOST)]
    host: String,

    #[arg(long, env = "STOCKX_HELPER_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Reject callbacks whose state does not match the one just generated.
    #[arg(long)]
    verify_state: bool,

    /// Do not open the helper page automatically.
    #[arg(long)]
    no_browser: bool,

    #[arg(long, env = "STOCKX_CLIENT_ID", default_value = "")]
    client_id: String,

    #[arg(long, env = "STOCKX_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    client_secret: String,

    #[arg(long, env = "STOCKX_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,
}

#[derive(Debug, Args)]
struct AuthorizeUrlArgs {
    #[arg(long, env = "STOCKX_CLIENT_ID")]
    client_id: String,

    #[arg(long, env = "STOCKX_REDIRECT_URI", default_value = "http://localhost:3000")]
    redirect_uri: String,

    /// Open the URL in the default browser as well.
    #[arg(long)]
    open: bool,
}

#[derive(Debug, Args)]
struct ExchangeArgs {
    /// The authorization code.
    #[arg(long, conflicts_with = "callback_url", required_unless_present = "callback_url")]
    code: Option<String>,

    /// The full URL the provider redirected to; the code is read from it.
    #[arg(long)]
    callback_url: Option<String>,

    #[arg(long, env = "STOCKX_CLIENT_ID")]
    client_id: String,

    #[arg(long, env = "STOCKX_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    #[arg(long, env = "STOCKX_REDIRECT_URI", default_value = "http://localhost:3000")]
    redirect_uri: String,

    /// Print an example catalog request using this API key.
    #[arg(long, env = "STOCKX_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), HelperError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None => run_serve(&cli.provider, cli.serve).await,
        Some(Command::Serve(args)) => run_serve(&cli.provider, args).await,
        Some(Command::AuthorizeUrl(args)) => run_authorize_url(&cli.provider, args),
        Some(Command::Exchange(args)) => run_exchange(&cli.provider, args).await,
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("stockx_oauth_helper=info,warn"),
        1 => EnvFilter::new("stockx_oauth_helper=debug,info"),
        _ => EnvFilter::new("stockx_oauth_helper=trace,debug"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_serve(provider: &ProviderArgs, args: ServeArgs) -> Result<(), HelperError> {
    let config = LocalServerConfig::new(args.host, args.port).with_verify_state(args.verify_state);
    let server = HelperServer::with_exchanger(config, provider.exchanger()?)?
        .with_credentials(Credentials::new(
            args.client_id,
            args.client_secret,
            args.api_key,
        ));

    let listener = server.bind().await?;
    let origin = server.origin();
    eprintln!("Helper running at {origin}");
    eprintln!("Register {origin} as an allowed redirect URI for your StockX application.");

    if !args.no_browser {
        let url = Url::parse(&origin)?;
        if let Err(err) = BrowserNavigator.assign(&url) {
            eprintln!("Failed to open browser automatically: {err}");
        }
    }

    server
        .serve_with(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

fn run_authorize_url(provider: &ProviderArgs, args: AuthorizeUrlArgs) -> Result<(), HelperError> {
    let provider = provider.provider();
    let request = if args.open {
        start_authorization(
            &provider,
            &args.client_id,
            &args.redirect_uri,
            &mut BrowserNavigator,
        )?
    } else {
        authorization_request(&provider, &args.client_id, &args.redirect_uri)?
    };

    println!("{}", request.authorization_url);
    eprintln!("state: {}", request.state);
    Ok(())
}

async fn run_exchange(provider: &ProviderArgs, args: ExchangeArgs) -> Result<(), HelperError> {
    let code = match (args.code, args.callback_url) {
        (Some(code), _) => code,
        (None, Some(callback_url)) => CallbackParams::parse(&callback_url)?.into_code()?,
        (None, None) => String::new(),
    };

    let exchanger = provider.exchanger()?;
    let request = ExchangeRequest::new(code, args.client_id, args.client_secret, args.redirect_uri);
    let tokens = exchanger.exchange(&request).await?;

    let output =
        serde_json::to_string_pretty(&tokens).map_err(|err| HelperError::InvalidResponse {
            message: err.to_string(),
            body: String::new(),
        })?;
    println!("{output}");

    if let Some(api_key) = args.api_key.filter(|key| !key.is_empty()) {
        let example = ApiExample::new(
            exchanger.provider().catalog_url.as_str(),
            tokens.access_token.as_str(),
            api_key,
        );
        eprintln!("\nAPI request example:\n{example}");
    }
    Ok(())
}
