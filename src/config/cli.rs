use crate::domain::ports::SortOrder;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "birthday-tracker")]
#[command(about = "Administer the congregation's birthday register")]
pub struct CliConfig {
    /// Path to the settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password and persist the session
    Login {
        #[arg(long)]
        email: String,

        /// Password; prompted on stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create a new account
    Register {
        #[arg(long)]
        email: String,

        /// Password; prompted on stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and clear the stored session
    Logout,

    /// List the register, ordered by date of birth
    List {
        #[arg(long, value_enum, default_value = "asc")]
        order: Order,

        /// Only show people born in this month (1-12)
        #[arg(long)]
        month: Option<u32>,
    },

    /// Show who celebrates a birthday today
    Today,

    /// Add a person to the register
    Add {
        #[arg(long)]
        name: String,

        /// Date of birth, YYYY-MM-DD or DD/MM/YYYY
        #[arg(long)]
        date: String,

        /// Profile photo to compress and upload
        #[arg(long)]
        photo: Option<PathBuf>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Edit a record; omitted fields keep their current value
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        date: Option<String>,

        /// Replacement photo; the old one is removed after the update
        #[arg(long)]
        photo: Option<PathBuf>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a record and its stored photo
    Delete {
        id: String,

        /// Leave the stored photo in place
        #[arg(long)]
        keep_photo: bool,
    },

    /// Show or change the display theme
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Ascending,
            Order::Desc => SortOrder::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}
