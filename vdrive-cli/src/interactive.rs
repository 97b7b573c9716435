use std::path::PathBuf;

use console::style;
use inquire::{CustomType, Select, Text};
use vdrive::vfs::{DriveLetter, MAX_DRIVES};

use crate::commands::{self, setup};
use crate::error::Result;
use crate::utils;

const MENU_OPTIONS: &[&str] = &[
    "📂 Browse folder",
    "🌳 Show folder tree",
    "📁 New folder",
    "💾 Save local file",
    "📤 Upload to library",
    "🖼️ Media library",
    "💿 Drive usage",
    "🧹 Reset drives",
    "❌ Exit",
];

pub async fn run() -> Result<()> {
    utils::print_welcome();

    if commands::open_session()?.needs_setup() {
        handle_setup().await?;
    }

    loop {
        println!();
        let choice = Select::new("What would you like to do?", MENU_OPTIONS.to_vec()).prompt()?;

        match choice {
            "📂 Browse folder" => {
                if let Err(e) = handle_browse().await {
                    utils::print_error(&format!("Failed to open folder: {e}"));
                }
            }
            "🌳 Show folder tree" => {
                if let Err(e) = handle_tree().await {
                    utils::print_error(&format!("Failed to show tree: {e}"));
                }
            }
            "📁 New folder" => {
                if let Err(e) = handle_new_folder().await {
                    utils::print_error(&format!("Failed to create folder: {e}"));
                }
            }
            "💾 Save local file" => {
                if let Err(e) = handle_save().await {
                    utils::print_error(&format!("Failed to save file: {e}"));
                }
            }
            "📤 Upload to library" => {
                if let Err(e) = handle_upload().await {
                    utils::print_error(&format!("Upload failed: {e}"));
                }
            }
            "🖼️ Media library" => {
                if let Err(e) = commands::library::execute(None).await {
                    utils::print_error(&format!("Failed to list library: {e}"));
                }
            }
            "💿 Drive usage" => {
                if let Err(e) = commands::drives::execute().await {
                    utils::print_error(&format!("Failed to list drives: {e}"));
                }
            }
            "🧹 Reset drives" => {
                if let Err(e) = commands::reset::execute(false).await {
                    utils::print_error(&format!("Failed to reset: {e}"));
                }
                if commands::open_session()?.needs_setup() {
                    handle_setup().await?;
                }
            }
            "❌ Exit" => {
                utils::print_success("Goodbye! 👋");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

async fn handle_setup() -> Result<()> {
    println!("\n{}", style("💿 Drive Setup").bold().cyan());
    utils::print_info("No drives yet. Choose how many to create.");

    let counts: Vec<usize> = (1..=MAX_DRIVES).collect();
    let count = Select::new("Number of drives:", counts).prompt()?;

    let mut capacities = Vec::with_capacity(count);
    for (index, letter) in DriveLetter::ALL[..count].iter().enumerate() {
        let capacity = CustomType::<u64>::new(&format!("Capacity of {} in MB:", letter.display_name()))
            .with_default(setup::default_capacity(index))
            .with_help_message(&format!(
                "Between {} and {} MB",
                setup::MIN_CAPACITY_MB,
                setup::MAX_CAPACITY_MB
            ))
            .with_error_message("Please type a whole number of megabytes")
            .prompt()?;
        capacities.push(setup::clamp_capacity(capacity));
    }

    commands::setup::execute(count, &capacities).await
}

fn prompt_folder(message: &str) -> Result<String> {
    Ok(Text::new(message)
        .with_default("C:\\")
        .with_help_message("Drive letter and folders, e.g. C:\\Windows or D:/Docs")
        .prompt()?)
}

async fn handle_browse() -> Result<()> {
    let path = prompt_folder("Folder:")?;
    commands::ls::execute(&path).await
}

async fn handle_tree() -> Result<()> {
    let path = prompt_folder("Folder:")?;
    let depth = CustomType::<usize>::new("Maximum depth:")
        .with_default(3)
        .with_help_message("How deep to show the folder tree")
        .prompt()?;
    commands::tree::execute(&path, depth).await
}

async fn handle_new_folder() -> Result<()> {
    let parent = prompt_folder("Create inside:")?;
    let name = Text::new("Folder name:").prompt()?;
    commands::mkdir::execute(&parent, &name).await
}

async fn handle_save() -> Result<()> {
    println!("\n{}", style("💾 Save File").bold().green());
    let local = Text::new("Local file:")
        .with_help_message("Path of the file to copy onto a drive")
        .prompt()?;
    let destination = prompt_folder("Save to:")?;
    let name = Text::new("Name on the drive:")
        .with_help_message("Leave empty to keep the local name")
        .prompt()?;
    let name = Some(name.trim()).filter(|n| !n.is_empty());

    commands::save::execute(&PathBuf::from(local), &destination, name).await
}

async fn handle_upload() -> Result<()> {
    println!("\n{}", style("📤 Upload").bold().green());
    let local = Text::new("Local file:")
        .with_help_message("Images, text files and .js/.html/.css/.py sources")
        .prompt()?;
    let destination = prompt_folder("Place on drive at:")?;
    let description = Text::new("Description:")
        .with_help_message("Used for images, leave empty to use the file name")
        .prompt()?;
    let description = Some(description.trim()).filter(|d| !d.is_empty());

    commands::upload::execute(&PathBuf::from(local), &destination, description).await
}
