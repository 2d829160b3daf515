use bgcast_core::*;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bgcast")]
#[command(about = "Meal-time insulin dosing and blood glucose forecasting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show ICR and ISF derived from total daily dose
    Ratios {
        /// Total daily dose (units)
        #[arg(long)]
        tdd: Option<f64>,
    },

    /// Calculate the insulin dose for a meal
    Dose {
        /// Carbohydrates (grams)
        #[arg(long)]
        carbs: f64,

        /// Grams covered per unit (defaults to the profile or 500/TDD)
        #[arg(long)]
        ratio: Option<f64>,

        /// Current BG reading
        #[arg(long)]
        bg: Option<f64>,

        /// Unit of --bg (mg/dL, mmol/L)
        #[arg(long)]
        unit: Option<BgUnit>,

        /// mmol/L drop per unit
        #[arg(long)]
        correction_factor: Option<f64>,

        /// Total daily dose (units)
        #[arg(long)]
        tdd: Option<f64>,
    },

    /// Forecast BG for the next three hours after a meal
    Forecast {
        /// Meal estimate JSON from the vision pipeline ('-' for stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Carbohydrates (grams)
        #[arg(long)]
        carbs: Option<f64>,

        /// Food description
        #[arg(long)]
        food: Option<String>,

        /// Administered dose, skipping the dose calculation
        #[arg(long)]
        dose: Option<f64>,

        /// Current BG reading
        #[arg(long)]
        bg: Option<f64>,

        /// Unit of --bg and of the output (mg/dL, mmol/L)
        #[arg(long)]
        unit: Option<BgUnit>,

        /// BG trend (rising, stable, falling)
        #[arg(long)]
        trend: Option<Trend>,

        /// Total daily dose (units)
        #[arg(long)]
        tdd: Option<f64>,

        /// mmol/L drop per unit
        #[arg(long)]
        correction_factor: Option<f64>,

        /// Grams covered per unit
        #[arg(long)]
        ratio: Option<f64>,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    bgcast_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!("Profile: {:?}", config.profile);

    match cli.command {
        Commands::Ratios { tdd } => cmd_ratios(tdd.unwrap_or(config.profile.total_daily_dose)),
        Commands::Dose {
            carbs,
            ratio,
            bg,
            unit,
            correction_factor,
            tdd,
        } => {
            let profile = ProfileConfig {
                total_daily_dose: tdd.unwrap_or(config.profile.total_daily_dose),
                correction_factor: correction_factor.unwrap_or(config.profile.correction_factor),
                carb_ratio: ratio.or(config.profile.carb_ratio),
                bg_unit: unit.unwrap_or(config.profile.bg_unit),
            };
            cmd_dose(carbs, bg, &profile)
        }
        Commands::Forecast {
            input,
            carbs,
            food,
            dose,
            bg,
            unit,
            trend,
            tdd,
            correction_factor,
            ratio,
            json,
        } => {
            let mut request = match input {
                Some(path) => read_request(&path)?,
                None => ForecastRequest::default(),
            };
            if let Some(carbs) = carbs {
                request.meal.carbs_grams = carbs;
            }
            if food.is_some() {
                request.meal.food_name = food;
            }
            request.insulin_dose = dose.or(request.insulin_dose);
            request.current_bg = bg.or(request.current_bg);
            request.bg_unit = unit.or(request.bg_unit);
            request.trend = trend.unwrap_or(request.trend);
            request.total_daily_dose = tdd.or(request.total_daily_dose);
            request.correction_factor = correction_factor.or(request.correction_factor);
            request.carb_ratio = ratio.or(request.carb_ratio);

            cmd_forecast(&request, &config.profile, json)
        }
    }
}

fn read_request(path: &Path) -> Result<ForecastRequest> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&contents)?)
}

fn cmd_ratios(tdd: f64) -> Result<()> {
    let ratios = calculate_icr_and_isf(tdd)?;

    println!("Total daily dose: {} u", tdd);
    println!("  ICR: {:.1} g/u", ratios.icr);
    println!("  ISF: {:.1} mg/dL/u", ratios.isf);
    Ok(())
}

fn cmd_dose(carbs: f64, bg: Option<f64>, profile: &ProfileConfig) -> Result<()> {
    profile.validate()?;
    let ratios = calculate_icr_and_isf(profile.total_daily_dose)?;
    let carb_ratio = profile.carb_ratio.unwrap_or(ratios.icr);

    let result = calculate_dose(&DosingInput {
        carbs_grams: carbs,
        carb_ratio,
        current_bg: bg,
        correction_factor: profile.correction_factor,
        bg_unit: profile.bg_unit,
    })?;

    println!("Carbs: {} g at {:.1} g/u", carbs, carb_ratio);
    display_dosing(&result);
    Ok(())
}

fn cmd_forecast(request: &ForecastRequest, profile: &ProfileConfig, json: bool) -> Result<()> {
    let analysis = analyze(request, profile)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        display_analysis(request, &analysis);
    }

    Ok(())
}

fn fmt_bg(value: f64, unit: BgUnit) -> String {
    match unit {
        BgUnit::MgDl => format!("{:.0}", value),
        BgUnit::MmolL => format!("{:.1}", value),
    }
}

fn display_dosing(result: &DosingResult) {
    println!("  Base dose:        {:>6.2} u", result.base_dose);
    println!("  Correction:       {:>6.2} u", result.correction_dose);
    println!("  Safety:           {:>6.2} u", result.safety_adjustment);
    println!("  Total:            {:>6.2} u", result.total_dose);
}

fn display_analysis(request: &ForecastRequest, analysis: &Analysis) {
    let unit = analysis.bg_unit;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  BG FORECAST ({})", unit);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  {} ({} g carbs)",
        request.meal.food_name.as_deref().unwrap_or("Meal"),
        request.meal.carbs_grams
    );
    println!(
        "  ICR {:.1} g/u · ISF {:.1} mg/dL/u",
        analysis.ratios.icr, analysis.ratios.isf
    );
    println!();
    display_dosing(&analysis.dosing);
    if (analysis.insulin_dose - analysis.dosing.total_dose).abs() > f64::EPSILON {
        println!("  Administered:     {:>6.2} u", analysis.insulin_dose);
    }
    println!();

    let Some(forecast) = &analysis.forecast else {
        println!("  No usable BG reading - insufficient data to predict.");
        return;
    };

    for sample in &forecast.samples {
        println!(
            "  +{}:{:02}  {:>6}  {}",
            sample.minute_offset / 60,
            sample.minute_offset % 60,
            fmt_bg(sample.bg, unit),
            sample.bands.severity()
        );
    }
    println!();
    println!(
        "  Peak {} · Trough {} {}",
        fmt_bg(forecast.summary.max, unit),
        fmt_bg(forecast.summary.min, unit),
        unit
    );
}
