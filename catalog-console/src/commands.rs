//! Subcommand handlers

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use catalog_client::{
    CatalogApi, CatalogSnapshot, CatalogStore, Dialog, EditOutcome, ImageUpload, LoadReport,
    PanelState, ProductDraft, StoreError,
};

use crate::cli::{CategoryCommand, Command, ProductCommand, SizeCommand};
use crate::interactive;

/// Turn a store error into what the console prints.
///
/// An expired session keeps its type so `main` can tell it apart.
fn report(err: StoreError) -> anyhow::Error {
    match err {
        err @ StoreError::SessionExpired => anyhow::Error::new(err),
        other => anyhow::anyhow!(other.user_message()),
    }
}

/// Whether the command stopped because the session has to be renewed
pub fn is_session_expired(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::SessionExpired)
    )
}

fn warn_partial(report: &LoadReport) {
    for (collection, err) in &report.failures {
        if err.is_reportable() {
            eprintln!("warning: {collection:?} not refreshed: {}", err.user_message());
        }
    }
}

pub async fn run<A: CatalogApi + 'static>(
    store: &mut CatalogStore<A>,
    command: Command,
    search_delay: Duration,
) -> anyhow::Result<()> {
    let initial = store.load().await;
    if initial
        .failures
        .iter()
        .any(|(_, e)| matches!(e, StoreError::SessionExpired))
    {
        return Err(report(StoreError::SessionExpired));
    }
    warn_partial(&initial);

    match command {
        Command::Show => {
            print_categories(store.snapshot());
            println!();
            print_sizes(store.snapshot());
            println!();
            print_products(store.snapshot());
            Ok(())
        }
        Command::Category(cmd) => category(store, cmd).await,
        Command::Size(cmd) => size(store, cmd).await,
        Command::Product(cmd) => product(store, cmd).await,
        Command::Search => interactive::run(store, search_delay).await,
    }
}

async fn category<A: CatalogApi>(
    store: &mut CatalogStore<A>,
    cmd: CategoryCommand,
) -> anyhow::Result<()> {
    let reload = match cmd {
        CategoryCommand::List => {
            print_categories(store.snapshot());
            return Ok(());
        }
        CategoryCommand::Create { name } => store.create_category(&name).await,
        CategoryCommand::Rename { id, name } => store.update_category(id, &name).await,
        CategoryCommand::Delete { id } => store.delete_category(id).await,
    };
    warn_partial(&reload.map_err(report)?);
    print_categories(store.snapshot());
    Ok(())
}

async fn size<A: CatalogApi>(store: &mut CatalogStore<A>, cmd: SizeCommand) -> anyhow::Result<()> {
    let reload = match cmd {
        SizeCommand::List => {
            print_sizes(store.snapshot());
            return Ok(());
        }
        SizeCommand::Create { name } => store.create_size(&name).await,
        SizeCommand::Edit { id, name, order } => {
            let size = store
                .snapshot()
                .size(id)
                .cloned()
                .with_context(|| format!("size {id} not found"))?;
            let mut panel = PanelState::new();
            panel.open_edit_size(&size);
            if let Some(Dialog::EditSize {
                name: form_name,
                display_order,
                ..
            }) = panel.dialog_mut()
            {
                if let Some(name) = name {
                    *form_name = name;
                }
                if let Some(order) = order {
                    *display_order = order;
                }
            }
            match panel.submit(store).await {
                Ok(EditOutcome::Unchanged) => {
                    println!("Nothing to change");
                    return Ok(());
                }
                Ok(EditOutcome::Updated(report)) => Ok(report),
                Ok(EditOutcome::Swapped { displaced, report }) => {
                    println!("Swapped display order with size {displaced}");
                    Ok(report)
                }
                Err(err @ StoreError::PartialSwap { .. }) => {
                    // the store already reloaded; show what the server kept
                    print_sizes(store.snapshot());
                    return Err(report(err));
                }
                Err(err) => Err(err),
            }
        }
        SizeCommand::Delete { id } => store.delete_size(id).await,
    };
    warn_partial(&reload.map_err(report)?);
    print_sizes(store.snapshot());
    Ok(())
}

async fn product<A: CatalogApi>(
    store: &mut CatalogStore<A>,
    cmd: ProductCommand,
) -> anyhow::Result<()> {
    let reload = match cmd {
        ProductCommand::List => {
            print_products(store.snapshot());
            return Ok(());
        }
        ProductCommand::Available { product } => {
            let sizes = store
                .snapshot()
                .available_sizes(product)
                .with_context(|| format!("product {product} not found"))?;
            if sizes.is_empty() {
                println!("Every size is already added to this product");
            }
            for size in sizes {
                println!("{:>5}  {}", size.id, size.name);
            }
            return Ok(());
        }
        ProductCommand::Create {
            name,
            category,
            description,
            image,
        } => {
            let draft = ProductDraft {
                name,
                category_id: category,
                description,
            };
            let image = match image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };
            store.create_product(&draft, image.as_ref()).await
        }
        ProductCommand::AddSize {
            product,
            size,
            price,
            stock,
        } => {
            let mut panel = PanelState::new();
            panel.open_attach_size(store.snapshot(), product)?;
            if let Some(Dialog::AttachSize {
                size_id,
                price: form_price,
                stock: form_stock,
                ..
            }) = panel.dialog_mut()
            {
                *size_id = size;
                *form_price = price;
                *form_stock = stock;
            }
            panel.submit(store).await.map(EditOutcome::into_report)
        }
        ProductCommand::UpdateSize {
            product,
            size,
            price,
            stock,
        } => {
            if price.is_none() && stock.is_none() {
                anyhow::bail!("Nothing to update");
            }
            let mut panel = PanelState::new();
            panel.open_edit_size_link(store.snapshot(), product, size)?;
            if let Some(Dialog::EditSizeLink {
                price: form_price,
                stock: form_stock,
                ..
            }) = panel.dialog_mut()
            {
                if let Some(price) = price {
                    *form_price = price;
                }
                if let Some(stock) = stock {
                    *form_stock = stock;
                }
            }
            panel.submit(store).await.map(EditOutcome::into_report)
        }
        ProductCommand::RemoveSize { product, size } => store.detach_size(product, size).await,
    };
    warn_partial(&reload.map_err(report)?);
    print_products(store.snapshot());
    Ok(())
}

async fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("image path has no file name")?;
    Ok(ImageUpload::new(file_name, content_type(path), bytes))
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

// ========== Output ==========

fn print_categories(snapshot: &CatalogSnapshot) {
    println!("{:>5}  NAME", "ID");
    for category in snapshot.categories() {
        println!("{:>5}  {}", category.id, category.name);
    }
}

fn print_sizes(snapshot: &CatalogSnapshot) {
    println!("{:>5}  {:>5}  NAME", "ID", "ORDER");
    for size in snapshot.sizes_by_display_order() {
        println!("{:>5}  {:>5}  {}", size.id, size.display_order, size.name);
    }
}

pub(crate) fn print_products(snapshot: &CatalogSnapshot) {
    println!("{:>5}  {:<24}  CATEGORY", "ID", "NAME");
    for product in snapshot.products() {
        println!(
            "{:>5}  {:<24}  {}",
            product.id,
            product.name,
            snapshot.category_name(product.category_id)
        );
        for link in &product.sizes {
            println!(
                "       - {:<16} {:>8}  stock {}",
                link.size_name, link.price, link.stock
            );
        }
    }
}
