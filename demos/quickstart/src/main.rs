use pathdb::{Filtered, Store, StoreOptions, Value};
use std::time::Instant;

fn main() -> pathdb::Result<()> {
    env_logger::init();
    let started = Instant::now();

    let data_dir = std::env::var("PATHDB_DIR").unwrap_or_else(|_| "data".to_string());
    log::info!("Opening database in {data_dir}");

    let db = Store::open(StoreOptions::new(&data_dir, "test").filename("filename"))?;

    println!("Object creation (only if it doesn't exist)");
    let david: Value = serde_json::json!({
        "name": "David",
        "country": "CO",
        "info": "Nothing to show",
    })
    .into();
    println!("{}\n", db.create("0001", david)?);

    println!("Object creation (only if it doesn't exist)");
    let free: Value = serde_json::json!({
        "name": "Free",
        "country": "NI",
        "info": "Nothing to show",
    })
    .into();
    println!("{}\n", db.create("0002", free)?);

    println!("Obtaining an object with ID 0001");
    let Some(mut object) = db.get("0001")?.into_live() else {
        return Err(pathdb::PathDbError::NotFound { id: "0001".into() });
    };
    println!("{}\n", object.to_value());

    println!("Editing 'name' key and saving");
    print!("{} - ", object["name"]);
    object.set("name", "Deivid");
    object.save()?;
    println!("{}\n", object["name"]);

    println!("Setting directly the value of an element");
    println!("{}\n", db.set("0002.info", "Just a person")?);

    println!("List of objects");
    if let Some(all) = db.all()?.into_live() {
        for (id, user) in all.iter() {
            println!("   - {} ({id})", user["name"]);
        }
    }
    println!();

    println!("Finding an object with property 'country' as 'NI'");
    if let Some(found) = db.find(|u| u["country"] == Value::from("NI"), None)? {
        println!("{}\n", found.to_value());
    }

    println!("Filtering objects with property 'name'");
    match db.filter(|u| u["name"].is_truthy(), None)? {
        Filtered::Live(objects) => {
            for obj in objects {
                println!("   {} -> {}", obj.id(), obj.to_value());
            }
        }
        Filtered::Raw(pairs) => {
            for (key, value) in pairs {
                println!("   {key} -> {value}");
            }
        }
    }
    println!();

    println!("Deleting an object");
    println!("{}\n", db.delete("0001")?);

    println!("Done in {:?}", started.elapsed());
    Ok(())
}
