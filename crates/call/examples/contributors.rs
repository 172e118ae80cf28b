use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use micro_call::{CallFactory, Request, callback_fn};
use micro_client::HttpClient;
use serde::Deserialize;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Deserialize, Debug)]
struct Contributor {
    login: String,
    contributions: u64,
}

// expects a plain http server answering the url with a json array of contributors
fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let url = std::env::args().nth(1).unwrap_or_else(|| "http://127.0.0.1:8080/repos/square/retrofit/contributors".to_string());

    let client = HttpClient::builder().thread_name("contributors-dispatch").build().expect("can't start the http client");
    let factory = CallFactory::builder().timeout(Duration::from_secs(5)).build(Arc::new(client));
    let request = Request::get(url.as_str()).expect("invalid url");

    info!(%url, "fetch contributors synchronously");
    match factory.new_call(request.clone()).execute() {
        Ok(response) => match serde_json::from_slice::<Vec<Contributor>>(response.body().bytes()) {
            Ok(contributors) => {
                for contributor in &contributors {
                    info!(login = %contributor.login, contributions = contributor.contributions, "contributor");
                }
            }
            Err(e) => error!(cause = %e, status = %response.code(), "not a contributors list"),
        },
        Err(e) => error!(cause = %e, "call failed"),
    }

    info!(%url, "fetch contributors asynchronously");
    let (done_tx, done_rx) = mpsc::channel();
    let failure_tx = done_tx.clone();
    factory.new_call(request).enqueue(callback_fn(
        move |_call, response| {
            let contributors: Vec<Contributor> = serde_json::from_slice(response.body().bytes())?;
            info!(count = contributors.len(), "received contributors");
            done_tx.send(())?;
            Ok(())
        },
        move |_call, e| {
            error!(cause = %e, "call failed");
            let _ = failure_tx.send(());
        },
    ));

    if done_rx.recv_timeout(Duration::from_secs(10)).is_err() {
        error!("no answer from the asynchronous call");
    }
}
