//! Example: Working with records of one data service
//!
//! Connects with configuration from `DATASTACK_*` environment variables (or
//! a `datastack.toml` / `datastack.json` next to the working directory),
//! lists the services of an app and creates a record.
//!
//! # Setup
//!
//! ```bash
//! export DATASTACK_HOST=https://cloud.appveen.com
//! export DATASTACK_USERNAME=admin@appveen.com
//! export DATASTACK_PASSWORD=...
//! cargo run --example employee_records -- Adam Employees
//! ```

use datastack_domain::{ListOptions, SchemaFieldType};
use datastack_infra::{config, init_tracing, DataStack};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(true);

    let mut args = std::env::args().skip(1);
    let app_name = args.next().unwrap_or_else(|| "Adam".to_string());
    let service_name = args.next().unwrap_or_else(|| "Employees".to_string());

    let config = config::load()?;
    let ds = DataStack::connect(&config).await?;

    let app = ds.app(&app_name).await?;
    println!("Data services in {}:", app.id());
    for service in app.list_data_services(ListOptions::new()).await? {
        println!("  {} ({})", service.data().name.as_deref().unwrap_or("-"), service.id());
    }

    let service = app.data_service(&service_name).await?;
    let schema = service.schema();
    for field in schema.fields() {
        if *field.field_type() == SchemaFieldType::String {
            println!("  text field: {}", field.name().unwrap_or_default());
        }
    }

    let records = service.data_api()?;
    println!("{} records before insert", records.count_records(None).await?);

    let mut doc = records.new_document(None)?;
    doc.set_value("name", "Jane Doe")?.set_value("address.city", "Pune")?;
    let created = records.create_record(&doc, None).await?;
    println!("Created {}", created.id().unwrap_or_default());

    ds.logout().await?;
    Ok(())
}
