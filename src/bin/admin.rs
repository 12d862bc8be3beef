use ballotbox::{
    db,
    models::Role,
    repositories::{SqliteUserRepository, UserRepository},
    services::auth_service::hash_password,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ballotbox-admin")]
#[command(about = "Operator tool for managing voting system accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user. This is the only way to create admin accounts.
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,

        /// Account role: voter, party or admin
        #[arg(short, long, default_value = "admin")]
        role: Role,
    },

    /// List all users
    List,

    /// Delete a user
    Delete {
        /// Email address of the user to delete
        #[arg(short, long)]
        email: String,
    },
}

fn get_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn confirm_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    let password = get_password(prompt)?;
    let confirm = get_password("Confirm password")?;
    if password != confirm {
        eprintln!("❌ Passwords do not match");
        std::process::exit(1);
    }
    Ok(password)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    let users = Arc::new(SqliteUserRepository::new(pool));

    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                name,
                email,
                password,
                role,
            } => {
                let password = match password {
                    Some(pw) => pw,
                    None => confirm_password("Password")?,
                };

                let password_hash = match hash_password(&password) {
                    Ok(hash) => hash,
                    Err(err) => {
                        eprintln!("❌ Failed to hash password: {}", err);
                        std::process::exit(1);
                    }
                };

                match users.create_user(&name, &email, &password_hash, role).await {
                    Ok(user) => {
                        println!("✅ User created successfully!");
                        println!("  ID: {}", user.id);
                        println!("  Name: {}", user.name);
                        println!("  Email: {}", user.email);
                        println!("  Role: {}", user.role);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to create user: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::List => match users.list_users().await {
                Ok(users) => {
                    if users.is_empty() {
                        println!("No users found.");
                    } else {
                        println!(
                            "{:<5} {:<25} {:<35} {:<8} {:<10} {:<20}",
                            "ID", "Name", "Email", "Role", "Voted", "Created"
                        );
                        println!("{}", "-".repeat(105));
                        for user in users {
                            println!(
                                "{:<5} {:<25} {:<35} {:<8} {:<10} {:<20}",
                                user.id,
                                user.name,
                                user.email,
                                user.role.to_string(),
                                if user.has_voted { "Yes" } else { "No" },
                                user.created_at
                            );
                        }
                    }
                }
                Err(err) => {
                    eprintln!("❌ Failed to list users: {}", err);
                    std::process::exit(1);
                }
            },

            UserCommands::Delete { email } => match users.find_by_email(&email).await {
                Ok(Some(user)) => match users.delete_user(user.id).await {
                    Ok(()) => {
                        println!("✅ User '{}' deleted successfully!", email);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to delete user: {}", err);
                        std::process::exit(1);
                    }
                },
                Ok(None) => {
                    eprintln!("❌ User '{}' not found", email);
                    std::process::exit(1);
                }
                Err(err) => {
                    eprintln!("❌ Failed to find user: {}", err);
                    std::process::exit(1);
                }
            },
        },
    }

    Ok(())
}
