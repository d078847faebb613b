//! Plant CLI commands: add, list, show, update, remove, water, fertilize

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;

use super::output::Output;
use super::session::{parse_id, Session};
use crate::domain::{CareLevel, HealthStatus, NewPlant, Plant, PlantDetails, PlantPatch, PlantType};

/// Free-text descriptive fields accepted by `add` and `update`
#[derive(Args, Debug, Default)]
pub struct DetailArgs {
    /// Short description
    #[arg(long)]
    pub description: Option<String>,

    /// Image URL or path
    #[arg(long)]
    pub image: Option<String>,

    /// Care notes
    #[arg(long)]
    pub care_notes: Option<String>,

    /// Height (e.g. "60 cm")
    #[arg(long)]
    pub height: Option<String>,

    /// Pot size
    #[arg(long)]
    pub pot_size: Option<String>,

    /// Soil type
    #[arg(long)]
    pub soil_type: Option<String>,

    /// Fertilizer used
    #[arg(long)]
    pub fertilizer: Option<String>,

    /// Preferred humidity
    #[arg(long)]
    pub humidity: Option<String>,

    /// Preferred temperature
    #[arg(long)]
    pub temperature: Option<String>,

    /// Propagation method
    #[arg(long)]
    pub propagation: Option<String>,

    /// Common issue (repeatable)
    #[arg(long = "issue")]
    pub issues: Vec<String>,
}

impl From<DetailArgs> for PlantDetails {
    fn from(args: DetailArgs) -> Self {
        PlantDetails {
            image: args.image,
            description: args.description,
            care_notes: args.care_notes,
            height: args.height,
            pot_size: args.pot_size,
            soil_type: args.soil_type,
            fertilizer: args.fertilizer,
            humidity: args.humidity,
            temperature: args.temperature,
            propagation: args.propagation,
            common_issues: args.issues,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Plant name
    pub name: String,

    /// Where the plant lives (e.g. "Living Room")
    #[arg(long, short)]
    pub location: String,

    /// indoor, outdoor or indoor-outdoor
    #[arg(long = "type", default_value = "indoor")]
    pub plant_type: PlantType,

    /// Light needs: low, medium or high
    #[arg(long, default_value = "medium")]
    pub light: CareLevel,

    /// Water needs: low, medium or high (drives the watering schedule)
    #[arg(long)]
    pub water: Option<CareLevel>,

    /// Initial health (default: good)
    #[arg(long)]
    pub health: Option<HealthStatus>,

    /// Date acquired (default: today)
    #[arg(long)]
    pub acquired: Option<NaiveDate>,

    /// Date last watered (default: today)
    #[arg(long)]
    pub last_watered: Option<NaiveDate>,

    /// Date last fertilized (default: today)
    #[arg(long)]
    pub last_fertilized: Option<NaiveDate>,

    #[command(flatten)]
    pub details: DetailArgs,
}

impl From<AddArgs> for NewPlant {
    fn from(args: AddArgs) -> Self {
        NewPlant {
            name: args.name,
            location: args.location,
            plant_type: args.plant_type,
            light_needs: args.light,
            water_needs: args.water,
            health: args.health,
            acquired_date: args.acquired,
            last_watered: args.last_watered,
            last_fertilized: args.last_fertilized,
            details: args.details.into(),
        }
    }
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Plant ID
    pub id: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New location
    #[arg(long, short)]
    pub location: Option<String>,

    /// indoor, outdoor or indoor-outdoor
    #[arg(long = "type")]
    pub plant_type: Option<PlantType>,

    /// Light needs: low, medium or high
    #[arg(long)]
    pub light: Option<CareLevel>,

    /// Water needs (takes effect at the next watering)
    #[arg(long)]
    pub water: Option<CareLevel>,

    /// Health status
    #[arg(long)]
    pub health: Option<HealthStatus>,

    /// Date acquired
    #[arg(long)]
    pub acquired: Option<NaiveDate>,

    #[command(flatten)]
    pub details: DetailArgs,
}

impl UpdateArgs {
    fn into_patch(self) -> PlantPatch {
        PlantPatch {
            name: self.name,
            location: self.location,
            plant_type: self.plant_type,
            light_needs: self.light,
            water_needs: self.water,
            health: self.health,
            acquired_date: self.acquired,
            details: self.details.into(),
        }
    }
}

/// Filters for `list`
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only plants at this location (case-insensitive)
    #[arg(long, short)]
    pub location: Option<String>,

    /// Only plants with this health status
    #[arg(long)]
    pub health: Option<HealthStatus>,

    /// Only plants due for watering today or earlier
    #[arg(long)]
    pub thirsty: bool,
}

pub fn add(session: &Session, output: &Output, args: AddArgs) -> Result<()> {
    let (_, mut store) = session.open_store(output)?;
    let plant = store.add(args.into())?;

    if output.is_json() {
        output.json(&plant);
    } else {
        output.confirm(&format!(
            "Added plant: {} - {} (next watering {})",
            plant.id(),
            plant.name,
            plant.next_watering()
        ));
    }

    Ok(())
}

pub fn list(session: &Session, output: &Output, args: ListArgs) -> Result<()> {
    let (_, store) = session.open_store(output)?;
    let today = store.today();

    let location = args.location.map(|l| l.to_lowercase());
    let plants: Vec<&Plant> = store
        .list()
        .iter()
        .filter(|p| {
            location
                .as_ref()
                .map_or(true, |l| p.location.to_lowercase() == *l)
        })
        .filter(|p| args.health.map_or(true, |h| p.health() == h))
        .filter(|p| !args.thirsty || p.needs_watering(today))
        .collect();

    output.verbose_ctx(
        "list",
        &format!("{} of {} plants match", plants.len(), store.len()),
    );

    if output.is_json() {
        output.json(&plants);
    } else if plants.is_empty() {
        println!("No plants");
    } else {
        println!(
            "{:<16} {:<22} {:<16} {:<16} NEXT WATER",
            "ID", "NAME", "LOCATION", "HEALTH"
        );
        println!("{}", "-".repeat(84));

        for plant in plants {
            let marker = if plant.needs_watering(today) { " *" } else { "" };
            println!(
                "{:<16} {:<22} {:<16} {:<16} {}{}",
                plant.id(),
                truncate(&plant.name, 22),
                truncate(&plant.location, 16),
                plant.health(),
                plant.next_watering(),
                marker
            );
        }
    }

    Ok(())
}

pub fn show(session: &Session, output: &Output, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let (_, store) = session.open_store(output)?;

    let plant = store
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Plant not found: {}", id))?;

    if output.is_json() {
        output.json(plant);
        return Ok(());
    }

    let today = store.today();
    println!("{} ({})", plant.name, plant.id());
    println!("{}", "=".repeat(plant.name.len() + plant.id().as_str().len() + 3));
    output.row("Location", &plant.location);
    output.row("Type", plant.plant_type);
    output.row("Light needs", plant.light_needs);
    output.row("Water needs", plant.water_needs);
    output.row("Health", plant.health());
    output.row("Acquired", plant.acquired_date);
    output.row("Last watered", plant.last_watered());

    let overdue = plant.days_overdue(today);
    let due = if overdue > 0 {
        format!("{} ({} days overdue)", plant.next_watering(), overdue)
    } else if overdue == 0 {
        format!("{} (today)", plant.next_watering())
    } else {
        plant.next_watering().to_string()
    };
    output.row("Next watering", due);

    if let Some(date) = plant.last_fertilized() {
        output.row("Last fertilized", date);
    }
    if let Some(date) = plant.next_fertilizing() {
        output.row("Next fertilizing", date);
    }

    show_details(output, &plant.details);

    output.blank();
    println!("Care history:");
    for entry in plant.care_history() {
        if entry.notes.is_empty() {
            println!("  {}  {}", entry.date, entry.action);
        } else {
            println!("  {}  {} - {}", entry.date, entry.action, entry.notes);
        }
    }

    Ok(())
}

fn show_details(output: &Output, details: &PlantDetails) {
    if details.is_empty() {
        return;
    }

    output.blank();
    let fields = [
        ("Description", &details.description),
        ("Care notes", &details.care_notes),
        ("Height", &details.height),
        ("Pot size", &details.pot_size),
        ("Soil", &details.soil_type),
        ("Fertilizer", &details.fertilizer),
        ("Humidity", &details.humidity),
        ("Temperature", &details.temperature),
        ("Propagation", &details.propagation),
        ("Image", &details.image),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            output.row(label, value);
        }
    }
    if !details.common_issues.is_empty() {
        output.row("Common issues", details.common_issues.join(", "));
    }
}

pub fn update(session: &Session, output: &Output, args: UpdateArgs) -> Result<()> {
    let id = parse_id(&args.id)?;
    let patch = args.into_patch();
    if patch.is_empty() {
        bail!("Nothing to update. Pass at least one field, e.g. --location or --water.");
    }

    let (_, mut store) = session.open_store(output)?;
    let plant = store.update(&id, patch)?;

    if output.is_json() {
        output.json(&plant);
    } else {
        output.confirm(&format!("Updated plant: {} - {}", plant.id(), plant.name));
    }

    Ok(())
}

pub fn remove(session: &Session, output: &Output, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let (_, mut store) = session.open_store(output)?;
    let plant = store.remove(&id)?;

    if output.is_json() {
        output.json(&serde_json::json!({
            "removed": plant.id(),
            "name": plant.name,
        }));
    } else {
        output.confirm(&format!("Removed plant: {} - {}", plant.id(), plant.name));
    }

    Ok(())
}

pub fn water(session: &Session, output: &Output, id: &str, notes: &str) -> Result<()> {
    let id = parse_id(id)?;
    let (_, mut store) = session.open_store(output)?;
    let plant = store.water(&id, notes)?;

    if output.is_json() {
        output.json(&plant);
    } else {
        output.confirm(&format!(
            "Watered {} ({}). Next watering: {}",
            plant.name,
            plant.id(),
            plant.next_watering()
        ));
    }

    Ok(())
}

pub fn fertilize(session: &Session, output: &Output, id: &str, notes: &str) -> Result<()> {
    let id = parse_id(id)?;
    let (_, mut store) = session.open_store(output)?;
    let plant = store.fertilize(&id, notes)?;

    if output.is_json() {
        output.json(&plant);
    } else {
        let next = plant
            .next_fertilizing()
            .map(|d| d.to_string())
            .unwrap_or_default();
        output.confirm(&format!(
            "Fertilized {} ({}). Next fertilizing: {}",
            plant.name,
            plant.id(),
            next
        ));
    }

    Ok(())
}

/// Shortens `s` to at most `max` characters, marking the cut with `~`
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}
