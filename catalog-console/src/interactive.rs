//! Interactive product search
//!
//! Each stdin line stands for the current content of the search box. Lines go
//! through the debouncer; a fired query is issued on the store, fetched on a
//! spawned task, and its response handed back here to be applied (or dropped
//! if a newer query was issued meanwhile).

use std::time::Duration;

use catalog_client::search::fetch_products;
use catalog_client::{
    CatalogApi, CatalogStore, ClientResult, PendingSearch, Product, SearchDebouncer,
    SearchOutcome, StoreError,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::commands::print_products;

type Response = (PendingSearch, ClientResult<Vec<Product>>);

pub async fn run<A: CatalogApi + 'static>(
    store: &mut CatalogStore<A>,
    delay: Duration,
) -> anyhow::Result<()> {
    let (mut debouncer, mut fired) = SearchDebouncer::channel(delay);
    let (response_tx, mut responses) = mpsc::unbounded_channel::<Response>();
    let mut session = store.subscribe_session();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Type to search products, an empty line shows all, Ctrl-D to quit");
    tracing::debug!(delay_ms = delay.as_millis() as u64, "search loop started");

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => debouncer.input(line),
                None => break,
            },
            Some(query) = fired.recv() => {
                let pending = store.issue_search(query);
                let api = store.api();
                let tx = response_tx.clone();
                tokio::spawn(async move {
                    let result = fetch_products(&*api, &pending.query).await;
                    // receiver gone means the loop ended
                    let _ = tx.send((pending, result));
                });
            }
            Some((pending, result)) = responses.recv() => {
                match store.apply_search(&pending, result) {
                    Ok(SearchOutcome::Applied { count }) => {
                        tracing::debug!(count, "search applied");
                        print_products(store.snapshot());
                    }
                    Ok(SearchOutcome::Stale) => {}
                    Err(err) if err.is_reportable() => eprintln!("{}", err.user_message()),
                    Err(_) => {}
                }
            }
            Ok(_) = session.recv() => {
                debouncer.cancel();
                return Err(StoreError::SessionExpired.into());
            }
        }
    }

    debouncer.cancel();
    Ok(())
}
