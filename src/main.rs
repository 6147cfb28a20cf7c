use birthday_tracker::config::{CliConfig, Command, ThemeAction};
use birthday_tracker::utils::{logger, validation::Validate};
use birthday_tracker::{
    AppError, AppState, AuthProvider, BirthdayDraft, BirthdayRecord, BirthdayService,
    SessionStore, Settings, SupabaseClient, Theme,
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting birthday-tracker CLI");

    let settings_path = match &cli.config {
        Some(path) => path.clone(),
        None => Settings::default_path()?,
    };
    tracing::debug!("Settings file: {}", settings_path.display());

    if let Err(e) = run(cli, settings_path).await {
        tracing::error!("Command failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(if e.is_local() { 2 } else { 1 });
    }

    Ok(())
}

async fn run(cli: CliConfig, settings_path: PathBuf) -> birthday_tracker::Result<()> {
    let mut settings = Settings::load(&settings_path)?;

    // Theme changes are purely local; they work without backend credentials.
    if let Command::Theme { action } = &cli.command {
        return handle_theme(*action, &mut settings, &settings_path);
    }

    settings.validate()?;

    let session_store = SessionStore::beside(&settings_path);
    let session = session_store.load()?;
    let client = SupabaseClient::new(
        &settings.supabase.url,
        &settings.supabase.anon_key,
        &settings.supabase.table,
        &settings.supabase.bucket,
    )
    .with_access_token(session.as_ref().map(|s| s.access_token.clone()));

    match cli.command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            let session = client.sign_in(&email, &password).await?;
            session_store.save(&session)?;
            println!(
                "✅ Signed in as {}",
                session.user_email.as_deref().unwrap_or(&email)
            );
        }

        Command::Register { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            match client.sign_up(&email, &password).await? {
                Some(session) => {
                    session_store.save(&session)?;
                    println!(
                        "✅ Account created; signed in as {}",
                        session.user_email.as_deref().unwrap_or(&email)
                    );
                }
                None => {
                    println!("✅ Account created! Confirm it by email, then run `birthday-tracker login`.");
                }
            }
        }

        Command::Logout => {
            match session {
                Some(session) => {
                    if let Err(e) = client.sign_out(&session.access_token).await {
                        tracing::warn!("Remote sign-out failed: {}", e);
                    }
                    session_store.clear()?;
                    println!("✅ Signed out");
                }
                None => println!("Not signed in"),
            }
        }

        Command::List { order, month } => {
            require_session(&session)?;
            if let Some(month) = month {
                if !(1..=12).contains(&month) {
                    return Err(AppError::validation("month must be between 1 and 12"));
                }
            }
            let mut service = new_service(&client, &settings);
            let total = service.refresh(order.into()).await?;
            service.state_mut().set_month_filter(month);

            let today = today();
            let visible = service.state().filtered_records();
            for record in &visible {
                print_record(record, today);
            }
            match month {
                Some(month) => println!(
                    "{} of {} people have a birthday in month {}",
                    visible.len(),
                    total,
                    month
                ),
                None => println!("{} people in the register", total),
            }
        }

        Command::Today => {
            require_session(&session)?;
            let mut service = new_service(&client, &settings);
            service.refresh(Default::default()).await?;

            let today = today();
            let celebrating = service.birthdays_today(today);
            if celebrating.is_empty() {
                println!("No birthdays today. Check back tomorrow!");
            } else {
                for record in celebrating {
                    println!("🎂 {} turns {} today!", record.name, record.age_on(today));
                }
            }
        }

        Command::Add {
            name,
            date,
            photo,
            notes,
        } => {
            require_session(&session)?;
            let draft = BirthdayDraft::from_input(&name, &date, None, notes)?;
            let mut service = new_service(&client, &settings);
            let record = service.create(draft, photo.as_deref()).await?;
            println!("✅ Added {} (id {})", record.name, record.id);
        }

        Command::Edit {
            id,
            name,
            date,
            photo,
            notes,
        } => {
            require_session(&session)?;
            let mut service = new_service(&client, &settings);
            service.refresh(Default::default()).await?;

            let existing = service
                .state()
                .records()
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| {
                    AppError::remote("edit birthday", 404, format!("no record with id {}", id))
                })?;

            let draft = BirthdayDraft::from_input(
                name.as_deref().unwrap_or(&existing.name),
                &date.unwrap_or_else(|| existing.formatted_date()),
                existing.photo.clone(),
                notes.or(existing.notes.clone()),
            )?;

            let record = service.edit(&id, draft, photo.as_deref()).await?;
            println!("✅ Updated {} (id {})", record.name, record.id);
        }

        Command::Delete { id, keep_photo } => {
            require_session(&session)?;
            let mut service = new_service(&client, &settings);
            service.refresh(Default::default()).await?;

            let report = service.remove(&id, keep_photo).await?;
            println!("✅ Deleted record {}", report.id);
            if let Some(warning) = report.photo_warning {
                eprintln!("⚠️ {}", warning);
            }
        }

        Command::Theme { .. } => unreachable!("handled before backend setup"),
    }

    Ok(())
}

fn handle_theme(
    action: Option<ThemeAction>,
    settings: &mut Settings,
    settings_path: &PathBuf,
) -> birthday_tracker::Result<()> {
    let current = settings.display.theme;
    let next = match action {
        None => {
            println!("Current theme: {} {}", current, theme_icon(current));
            return Ok(());
        }
        Some(ThemeAction::Light) => Theme::Light,
        Some(ThemeAction::Dark) => Theme::Dark,
        Some(ThemeAction::Toggle) => current.toggle(),
    };

    settings.display.theme = next;
    settings.save(settings_path)?;
    println!("Theme set to {} {}", next, theme_icon(next));
    Ok(())
}

fn theme_icon(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "☀️",
        Theme::Dark => "🌙",
    }
}

fn new_service(
    client: &SupabaseClient,
    settings: &Settings,
) -> BirthdayService<SupabaseClient, SupabaseClient> {
    BirthdayService::new(
        client.clone(),
        client.clone(),
        AppState::with_theme(settings.display.theme),
    )
}

fn require_session(
    session: &Option<birthday_tracker::Session>,
) -> birthday_tracker::Result<()> {
    if session.is_none() {
        return Err(AppError::NotAuthenticated);
    }
    Ok(())
}

fn print_record(record: &BirthdayRecord, today: NaiveDate) {
    let cake = if record.is_birthday_on(today) { " 🎂" } else { "" };
    let notes = record.notes.as_deref().unwrap_or("-");
    println!(
        "{:<12} {:<24} {}  {} years  {}{}",
        record.id,
        record.name,
        record.formatted_date(),
        record.age_on(today),
        notes,
        cake
    );
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn prompt_password() -> birthday_tracker::Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end().to_string())
}
