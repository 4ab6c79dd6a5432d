//! Example: composing services from declarative definitions
//!
//! Definitions arrive as data (here a JSON document, as an outside loader might
//! produce), concrete types are registered once, and the container wires them
//! together on first use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use elif_container::{Container, Parameters, ServiceDefinition, TypeRegistry};
use serde_json::json;

struct Database {
    url: String,
    pool_size: u32,
}

struct UserRepository {
    database: Arc<Database>,
    table: String,
}

struct Mailer {
    host: String,
    sent: Mutex<Vec<String>>,
}

impl Mailer {
    fn send(&self, to: &str) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(to.to_string());
        }
    }
}

struct SignupService {
    users: Arc<UserRepository>,
    mailer: Arc<Mailer>,
    welcome_subject: Option<String>,
}

fn register_types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.register("Database", |args| {
        Ok(Database {
            url: args.string(0)?,
            pool_size: args.deserialize(1)?,
        })
    });
    types.register("UserRepository", |args| {
        Ok(UserRepository {
            database: args.service(0)?,
            table: args.string(1)?,
        })
    });
    types.register("Mailer", |args| {
        Ok(Mailer {
            host: args.string(0)?,
            sent: Mutex::new(Vec::new()),
        })
    });
    types
        .register("SignupService", |args| {
            Ok(SignupService {
                users: args.service(0)?,
                mailer: args.service(1)?,
                welcome_subject: None,
            })
        })
        .method("setWelcomeSubject", |service: &mut SignupService, args| {
            service.welcome_subject = Some(args.string(0)?);
            Ok(())
        });
    types
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let definitions: HashMap<String, ServiceDefinition> = serde_json::from_value(json!({
        "database": {
            "target": "Database",
            "arguments": [{"parameter": "database.url"}, {"parameter": "database.pool_size"}]
        },
        "users": {
            "target": "UserRepository",
            "arguments": [{"service": "database"}, "users"]
        },
        "mailer": {
            "target": "Mailer",
            "arguments": [{"parameter": "mail.host"}]
        },
        "signup": {
            "target": "SignupService",
            "arguments": [{"service": "users"}, {"service": "mailer"}],
            "calls": [{"method": "setWelcomeSubject", "arguments": [{"parameter": "mail.welcome"}]}]
        }
    }))?;

    let parameters = Parameters::from_value(json!({
        "database": {"url": "postgres://localhost/app", "pool_size": 8},
        "mail": {"host": "smtp.example.com", "welcome": "Welcome aboard"}
    }))?;

    let container = Container::new(definitions, parameters, register_types());

    if let Err(errors) = container.validate() {
        for error in &errors {
            eprintln!("invalid definition: {}", error);
        }
        return Err(errors[0].to_container_error().into());
    }

    let signup = container.get_as::<SignupService>("signup")?;
    signup.mailer.send("alice@example.com");

    println!(
        "signup uses table '{}' on {} (pool {}), mail via {}",
        signup.users.table,
        signup.users.database.url,
        signup.users.database.pool_size,
        signup.mailer.host
    );
    println!("welcome subject: {:?}", signup.welcome_subject);

    let mailer = container.get_as::<Mailer>("mailer")?;
    println!(
        "mailer shared with signup: {}, messages sent: {}",
        Arc::ptr_eq(&mailer, &signup.mailer),
        mailer.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    );
    println!(
        "{} of {} services constructed",
        container.instantiated_count(),
        container.service_count()
    );

    Ok(())
}
