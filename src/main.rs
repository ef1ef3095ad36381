use anyhow::{Context, Result};
use destination_resolver::config::{LoggingSettings, Settings};
use destination_resolver::destination::HttpDestination;
use destination_resolver::domain::RequestContext;
use destination_resolver::loader::{DefaultDestinationLoader, DestinationAccessor, DestinationLoaderChain};
use destination_resolver::service_binding::{
    ConnectivityProxyDestinationLoader, OnPremiseProxyHandler, StaticProxyToken,
    StaticServiceBindingAccessor,
};
use http::Uri;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: destination_resolver <destination-name> [request-uri]";

fn main() -> Result<()> {
    let settings = Settings::new().context("Failed to load configuration")?;
    init_tracing(&settings.logging);

    let mut args = std::env::args().skip(1);
    let name = args.next().context(USAGE)?;
    let request_uri: Uri = args
        .next()
        .as_deref()
        .unwrap_or("/")
        .parse()
        .context("Invalid request URI")?;

    resolve(&settings, &name, &request_uri)
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if logging.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[instrument(skip(settings))]
fn resolve(settings: &Settings, name: &str, request_uri: &Uri) -> Result<()> {
    let loader = Arc::new(DefaultDestinationLoader::new());
    for destination in settings.destinations() {
        loader.register(destination)?;
    }
    info!(count = loader.len(), "Registered configured destinations");

    let accessor = DestinationAccessor::new(DestinationLoaderChain::new(loader));
    let destination = accessor
        .get_destination(name)
        .with_context(|| format!("Failed to resolve destination '{name}'"))?;

    let mut builder = HttpDestination::from_destination(&destination);
    if let Some(handler) = on_premise_handler(settings) {
        builder = builder.on_premise_proxy_handler(handler);
    }
    let http = builder.build().context("Destination is not a usable HTTP destination")?;

    println!("name:                {}", http.name().unwrap_or_default());
    println!("url:                 {}", http.uri());
    println!("authentication:      {}", http.authentication_type());
    println!("proxy type:          {}", http.proxy_type());
    if let Some(proxy) = http.proxy_configuration() {
        println!("proxy:               {}", proxy.uri());
    }
    for (key, value) in http.query_parameters() {
        println!("query parameter:     {key}={value}");
    }

    let headers = http
        .headers(request_uri, &RequestContext::empty())
        .context("Failed to compute request headers")?;
    for header in headers {
        println!("header:              {}: {}", header.name(), mask_header_value(header.value()));
    }

    Ok(())
}

fn on_premise_handler(settings: &Settings) -> Option<Arc<OnPremiseProxyHandler>> {
    if settings.service_bindings.is_empty() {
        return None;
    }
    let Some(token) = settings.connectivity.proxy_token.clone() else {
        warn!("Service bindings are configured but no connectivity proxy token is set");
        return None;
    };

    Some(Arc::new(OnPremiseProxyHandler::new(
        Arc::new(StaticServiceBindingAccessor::new(settings.service_bindings.clone())),
        Arc::new(ConnectivityProxyDestinationLoader::new(Arc::new(StaticProxyToken::new(token)))),
    )))
}

fn mask_header_value(value: &str) -> String {
    let visible: String = value.chars().take(10).collect();
    if visible.len() < value.len() {
        format!("{visible}****")
    } else {
        value.to_string()
    }
}
