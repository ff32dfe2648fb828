use std::io::Write;
use std::sync::Arc;

use structopt::StructOpt;
use time::OffsetDateTime;

use crate::admin::{self, AdminConsole, PasswordForm, ThemeForm};
use crate::api::{GalleryApi, ImageFile};
use crate::auth::{AuthGate, AuthState};
use crate::client::Client;
use crate::error::Error;
use crate::gallery::{Filter, GalleryState, LIKE_FAILED};
use crate::lightbox::{Key, Lightbox};

const SESSION_LOST: &str = "Not signed in. Run `lumina admin login` first.";

#[derive(Debug, StructOpt)]
pub enum Command {
    /// List the photos of one theme, or of all themes.
    Gallery {
        #[structopt(long, default_value = "all")]
        theme: Filter,
    },
    /// List the themes photos can be filed under.
    Themes,
    /// Like a photo.
    Like {
        #[structopt(name = "PHOTO_ID")]
        photo_id: String,
    },
    /// Step through photos one at a time. Reads `right`, `left`, `like` and `esc` from stdin.
    Lightbox {
        #[structopt(long, default_value = "all")]
        theme: Filter,
        #[structopt(name = "PHOTO_ID")]
        photo_id: String,
    },
    Admin(AdminCommand),
}

#[derive(Debug, StructOpt)]
pub enum AdminCommand {
    /// Show whether a session is held and still valid.
    Status,
    /// Sign in, or create the admin account if none exists yet.
    Login {
        #[structopt(long)]
        username: String,
        #[structopt(long, env = "LUMINA_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show photo, like and theme counts.
    Stats,
    Upload(UploadArgs),
    DeletePhoto {
        #[structopt(name = "PHOTO_ID")]
        photo_id: String,
        /// Skip the confirmation prompt.
        #[structopt(long)]
        yes: bool,
    },
    CreateTheme {
        #[structopt(long)]
        name: String,
        #[structopt(long, default_value = "")]
        description: String,
    },
    DeleteTheme {
        #[structopt(name = "SLUG")]
        slug: String,
        /// Skip the confirmation prompt.
        #[structopt(long)]
        yes: bool,
    },
    ChangePassword {
        #[structopt(long, hide_env_values = true, env = "LUMINA_ADMIN_PASSWORD")]
        current: String,
        #[structopt(long)]
        new: String,
        #[structopt(long)]
        confirm: String,
    },
}

#[derive(Debug, StructOpt)]
pub struct UploadArgs {
    #[structopt(long)]
    title: String,
    /// Slug of the theme to file the photo under.
    #[structopt(long)]
    theme: String,
    #[structopt(long, default_value = "")]
    description: String,
    /// Path to the image file to upload.
    #[structopt(name = "PATH", parse(from_os_str))]
    file_path: std::path::PathBuf,
}

pub(crate) async fn run<A: GalleryApi + 'static>(
    client: Arc<Client<A>>,
    command: Command,
) -> Result<(), crate::Error> {
    match command {
        Command::Gallery { theme } => list_gallery(&client, theme).await,
        Command::Themes => list_themes(&client).await,
        Command::Like { photo_id } => like(&client, &photo_id).await,
        Command::Lightbox { theme, photo_id } => lightbox(&client, theme, &photo_id).await,
        Command::Admin(command) => run_admin(&client, command).await,
    }
}

fn report(result: Result<(), Error>, success: &str, fallback: &str) -> Result<(), crate::Error> {
    match result {
        Ok(()) => {
            println!("{}", success);
            Ok(())
        },
        Err(Error::Unauthorized) => {
            eprintln!("{}", SESSION_LOST);
            Err(Error::Unauthorized.into())
        },
        Err(err) => {
            eprintln!("{}", err.notice(fallback));
            Err(err.into())
        },
    }
}

async fn confirm(prompt: &str) -> std::io::Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    async_std::io::stdin().read_line(&mut line).await?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

async fn list_gallery<A: GalleryApi + 'static>(
    client: &Arc<Client<A>>,
    filter: Filter,
) -> Result<(), crate::Error> {
    let mut gallery = GalleryState::new();
    gallery.select(client, filter).await?;

    for photo in gallery.photos() {
        let liked = if gallery.is_liked(&photo.id) { " (liked)" } else { "" };
        println!(
            "{}\t{}\t{}\t{} likes{}\t{}",
            photo.id,
            photo.title,
            photo.theme,
            photo.likes,
            liked,
            client.image_url(photo)
        );
    }
    if gallery.photos().is_empty() {
        println!("No photos in {}", gallery.filter());
    }
    Ok(())
}

async fn list_themes<A: GalleryApi + 'static>(client: &Arc<Client<A>>) -> Result<(), crate::Error> {
    for theme in client.list_themes().await? {
        match theme.description {
            Some(description) if !description.is_empty() => {
                println!("{}\t{}\t{}", theme.slug, theme.name, description)
            },
            _ => println!("{}\t{}", theme.slug, theme.name),
        }
    }
    Ok(())
}

async fn like<A: GalleryApi + 'static>(client: &Arc<Client<A>>, photo_id: &str) -> Result<(), crate::Error> {
    let mut gallery = GalleryState::new();
    gallery.load(client).await?;

    match gallery.like(client, photo_id).await {
        Ok(outcome) => {
            println!("{}", outcome.notice());
            if let Some(photo) = gallery.photo(photo_id) {
                println!("{} now has {} likes", photo.title, photo.likes);
            }
            Ok(())
        },
        Err(err) => {
            eprintln!("{}", err.notice(LIKE_FAILED));
            Err(err.into())
        },
    }
}

async fn lightbox<A: GalleryApi + 'static>(
    client: &Arc<Client<A>>,
    filter: Filter,
    photo_id: &str,
) -> Result<(), crate::Error> {
    let mut gallery = GalleryState::new();
    gallery.select(client, filter).await?;

    let mut lightbox = Lightbox::new();
    if !lightbox.open(gallery.photos(), photo_id) {
        eprintln!("Photo {} is not in {}", photo_id, gallery.filter());
        return Ok(());
    }

    let stdin = async_std::io::stdin();
    while let Some(photo) = lightbox.current(gallery.photos()) {
        let heart = if gallery.is_liked(&photo.id) { "♥" } else { "♡" };
        println!(
            "[{}] {} {} {}  {}",
            photo.id,
            photo.title,
            heart,
            photo.likes,
            client.image_url(photo)
        );

        let mut line = String::new();
        if stdin.read_line(&mut line).await? == 0 {
            break;
        }

        if line.trim() == "like" {
            let photo_id = photo.id.clone();
            match gallery.like(client, &photo_id).await {
                Ok(outcome) => println!("{}", outcome.notice()),
                Err(err) => eprintln!("{}", err.notice(LIKE_FAILED)),
            }
            continue;
        }

        let key = line.parse().unwrap_or(Key::Other);
        lightbox.handle_key(key, gallery.photos());
    }

    Ok(())
}

async fn mount<A: GalleryApi>(client: &Client<A>) -> Result<AdminConsole, crate::Error> {
    let mut console = AdminConsole::new();
    match console.mount(client).await {
        Ok(()) => Ok(console),
        Err(Error::Unauthorized) => {
            eprintln!("{}", SESSION_LOST);
            Err(Error::Unauthorized.into())
        },
        Err(err) => {
            eprintln!("{}", err.notice(admin::LOAD_FAILED));
            Err(err.into())
        },
    }
}

async fn run_admin<A: GalleryApi>(client: &Client<A>, command: AdminCommand) -> Result<(), crate::Error> {
    match command {
        AdminCommand::Status => {
            let mut gate = AuthGate::new();
            match gate.enter(client).await {
                AuthState::Authenticated => println!("Signed in"),
                AuthState::NeedsSetup => println!("No admin account yet. `lumina admin login` creates one."),
                _ => println!("Not signed in"),
            }
            Ok(())
        },
        AdminCommand::Login { username, password } => {
            let mut gate = AuthGate::new();
            if gate.enter(client).await == &AuthState::Authenticated {
                println!("Already signed in");
                return Ok(());
            }
            gate.form.username = username;
            gate.form.password = password;
            match gate.submit(client).await {
                Ok(mode) => {
                    println!("{}", mode.success_notice());
                    Ok(())
                },
                Err(err) => {
                    eprintln!("{}", err.notice("Authentication failed"));
                    Err(err.into())
                },
            }
        },
        AdminCommand::Logout => {
            let mut gate = AuthGate::new();
            println!("{}", gate.logout(client));
            Ok(())
        },
        AdminCommand::Stats => {
            let console = mount(client).await?;
            let stats = console.stats(OffsetDateTime::now_utc());
            println!("Photos:       {}", stats.total_photos);
            println!("Likes:        {}", stats.total_likes);
            println!("Themes:       {}", stats.themes);
            println!("Last 7 days:  {}", stats.recent_photos);
            Ok(())
        },
        AdminCommand::Upload(args) => {
            let image = ImageFile::read(&args.file_path).await?;
            let mut console = mount(client).await?;
            console.open_upload();
            console.upload_form.title = args.title;
            console.upload_form.description = args.description;
            console.upload_form.theme = Some(args.theme);
            console.upload_form.select_image(image);
            let result = console.upload(client).await;
            report(result, admin::upload::UPLOADED, admin::upload::UPLOAD_FAILED)
        },
        AdminCommand::DeletePhoto { photo_id, yes } => {
            let mut console = mount(client).await?;
            let title = match console.photos().iter().find(|photo| photo.id == photo_id) {
                Some(photo) => photo.title.clone(),
                None => photo_id.clone(),
            };
            console.request_photo_delete(&photo_id);
            if !yes && !confirm(&format!("Delete photo \"{}\"?", title)).await? {
                console.cancel_confirmation();
                println!("Cancelled");
                return Ok(());
            }
            let result = console.confirm_photo_delete(client).await;
            report(result, admin::PHOTO_DELETED, admin::PHOTO_DELETE_FAILED)
        },
        AdminCommand::CreateTheme { name, description } => {
            let mut console = mount(client).await?;
            console.open_themes();
            console.theme_form = ThemeForm { name, description };
            let result = console.create_theme(client).await;
            report(
                result,
                admin::themes::THEME_CREATED,
                admin::themes::THEME_CREATE_FAILED,
            )
        },
        AdminCommand::DeleteTheme { slug, yes } => {
            let mut console = mount(client).await?;
            console.open_themes();
            console.request_theme_delete(&slug);
            if !yes && !confirm(&format!("Delete theme \"{}\"? Photos keep their theme.", slug)).await? {
                console.cancel_confirmation();
                println!("Cancelled");
                return Ok(());
            }
            let result = console.confirm_theme_delete(client).await;
            report(
                result,
                admin::themes::THEME_DELETED,
                admin::themes::THEME_DELETE_FAILED,
            )
        },
        AdminCommand::ChangePassword {
            current,
            new,
            confirm,
        } => {
            let mut console = mount(client).await?;
            console.open_settings();
            console.password_form = PasswordForm {
                current_password: current,
                new_password: new,
                confirm_password: confirm,
            };
            let result = console.change_password(client).await;
            report(
                result,
                admin::settings::PASSWORD_CHANGED,
                admin::settings::PASSWORD_CHANGE_FAILED,
            )
        },
    }
}
