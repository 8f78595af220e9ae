use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use glucors::alerts::{Alert, AlertGenerator};
use glucors::challenges::daily_challenges;
use glucors::config::{AppConfig, CONFIG_KEYS};
use glucors::foods::{
    all_foods, diabetes_friendly_foods, diet_recommendations, food_recommendations_by_status,
    foods_by_impact, foods_to_limit, FoodEntry, ImpactTier, StatusFoodGuide,
};
use glucors::import::load_readings;
use glucors::insights::{advice_for, education_for, personalized_insights, weekly_trend};
use glucors::logging::{init_logging, LogLevel};
use glucors::models::{DiabetesType, Locale, MealContext, Reading, Severity, StatusColor};
use glucors::patterns::{recent_readings, PatternAnalyzer, PatternSnapshot};
use glucors::predictions::{predict_food_impact_or_err, predict_for_meal};
use glucors::progress::{available_badges, evaluate_progress};
use glucors::report::{export_json, load_snapshots, ReportBuilder, UserSnapshot};

/// glucors - Glucose Pattern Analytics CLI
///
/// Analyzes blood glucose readings for patterns, predictive alerts, Kenyan
/// food impact, and progress streaks, badges and daily challenges.
#[derive(Parser)]
#[command(name = "glucors")]
#[command(author = "glucors Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Glucose pattern analytics CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output language (en, sw); unknown codes fall back to en
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Reference date for streaks and challenges (YYYY-MM-DD, default today)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize glucose patterns and trend
    Analyze {
        /// Readings file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show predictive alerts for a reading history
    Alerts {
        /// Readings file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Also predict the next meal in this context (e.g. pre_meal)
        #[arg(short, long)]
        meal: Option<MealContext>,
    },

    /// Predict the glucose impact of a food
    Food {
        /// Food name, e.g. "ugali" or "sukuma wiki"
        name: String,

        /// Readings file used for the personal post-meal baseline
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Browse the food catalog
    Foods {
        /// Only foods with this impact tier (none, low, medium, high, very_high)
        #[arg(short, long)]
        impact: Option<ImpactTier>,

        /// Only low or no impact foods
        #[arg(long, conflicts_with_all = ["impact", "limit"])]
        friendly: bool,

        /// Only high or very high impact foods
        #[arg(long, conflicts_with = "impact")]
        limit: bool,

        /// Show diet recommendations for a diabetes type (type1, type2)
        #[arg(short, long)]
        diet: Option<DiabetesType>,
    },

    /// Show streak, level, points and badges
    Progress {
        /// Readings file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// List every badge with its earned flag
        #[arg(short, long)]
        all: bool,
    },

    /// Show daily challenge status
    Challenges {
        /// Readings file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Day to evaluate (YYYY-MM-DD, default --today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Evaluate a single reading and suggest what to eat next
    Evaluate {
        /// Glucose value in mg/dL
        value: f64,

        /// Meal context (fasting, pre_meal, post_meal, bedtime, none)
        #[arg(short = 'x', long, default_value = "none")]
        context: MealContext,
    },

    /// Show advice and background reading for the configured profile
    Advice,

    /// Show educational insights and the weekly trend
    Insights {
        /// Readings file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Build the full dashboard report
    Report {
        /// Readings file for the configured profile
        #[arg(short, long, conflicts_with = "batch")]
        file: Option<PathBuf>,

        /// JSON file with one or more user snapshots
        #[arg(short, long)]
        batch: Option<PathBuf>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

/// Resolved per-invocation settings
struct Session {
    config: AppConfig,
    config_path: PathBuf,
    locale: Locale,
    today: NaiveDate,
    json: bool,
}

impl Session {
    fn analyzer(&self) -> PatternAnalyzer {
        PatternAnalyzer::with_config(self.config.analysis.clone())
    }

    fn alert_generator(&self) -> AlertGenerator {
        AlertGenerator::with_config(self.config.alerts.clone())
    }

    /// Resolve a readings path, falling back to the configured data directory
    fn readings(&self, file: &Path) -> Result<Vec<Reading>> {
        let path = if file.exists() || file.is_absolute() {
            file.to_path_buf()
        } else {
            self.config.settings.data_dir.join(file)
        };
        load_readings(&path).with_context(|| format!("Failed to load readings from {}", path.display()))
    }

    /// Readings inside a look-back window ending at `today`
    fn recent(&self, readings: &[Reading], days: u64) -> Vec<Reading> {
        recent_readings(readings, self.today, days)
    }

    /// Snapshot over the configured analysis window
    fn snapshot(&self, readings: &[Reading]) -> Option<PatternSnapshot> {
        let recent = self.recent(readings, self.config.settings.analysis_window_days);
        self.analyzer().analyze(&recent)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let config = AppConfig::load_or_default_from(&config_path);

    let mut log_config = config.logging.clone();
    log_config.level = match cli.verbose {
        0 => log_config.level,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    init_logging(&log_config)?;

    let locale = cli
        .lang
        .as_deref()
        .map(Locale::from_code)
        .unwrap_or(config.settings.locale);

    let mut session = Session {
        config,
        config_path,
        locale,
        today: cli.today.unwrap_or_else(|| Local::now().date_naive()),
        json: cli.json,
    };

    match cli.command {
        Commands::Analyze { file } => analyze(&session, &file),
        Commands::Alerts { file, meal } => alerts(&session, &file, meal),
        Commands::Food { name, file } => food(&session, &name, file.as_deref()),
        Commands::Foods {
            impact,
            friendly,
            limit,
            diet,
        } => foods(&session, impact, friendly, limit, diet),
        Commands::Progress { file, all } => progress(&session, &file, all),
        Commands::Challenges { file, date } => challenges(&session, &file, date),
        Commands::Evaluate { value, context } => evaluate(&session, value, context),
        Commands::Advice => advice(&session),
        Commands::Insights { file } => insights(&session, &file),
        Commands::Report {
            file,
            batch,
            output,
        } => report(&session, file.as_deref(), batch.as_deref(), output.as_deref()),
        Commands::Config { list, set, get } => configure(&mut session, list, set, get),
    }
}

fn print_json<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::High => "HIGH".red().bold(),
        Severity::Medium => "MEDIUM".yellow().bold(),
        Severity::Low => "LOW".green(),
    }
}

fn analyze(session: &Session, file: &Path) -> Result<()> {
    let readings = session.readings(file)?;
    let snapshot = session.snapshot(&readings);

    if session.json {
        return print_json(&snapshot.as_ref().map(|s| s.summary()));
    }

    let Some(snapshot) = snapshot else {
        println!(
            "{}",
            format!(
                "Not enough readings in the last {} days to analyze ({} of {} needed)",
                session.config.settings.analysis_window_days,
                session
                    .recent(&readings, session.config.settings.analysis_window_days)
                    .len(),
                session.analyzer().config().min_readings
            )
            .yellow()
        );
        return Ok(());
    };

    println!("{}", "Glucose Patterns".cyan().bold());
    println!("  Readings:        {}", snapshot.reading_count);
    println!(
        "  Pre-meal avg:    {} ({} samples)",
        fmt_opt(snapshot.avg_pre_meal),
        snapshot.pre_meal_count
    );
    println!(
        "  Post-meal avg:   {} ({} samples)",
        fmt_opt(snapshot.avg_post_meal),
        snapshot.post_meal_count
    );
    println!("  High readings:   {}", snapshot.high_count.to_string().red());
    println!("  Low readings:    {}", snapshot.low_count.to_string().yellow());
    println!("  Recent trend:    {:?}", snapshot.trend);

    #[derive(Tabled)]
    struct HourRow {
        #[tabled(rename = "Hour")]
        hour: String,
        #[tabled(rename = "Readings")]
        count: usize,
        #[tabled(rename = "Mean mg/dL")]
        mean: String,
    }

    let rows: Vec<HourRow> = snapshot
        .hour_buckets
        .iter()
        .map(|(hour, values)| HourRow {
            hour: format!("{:02}:00", hour),
            count: values.len(),
            mean: fmt_opt(snapshot.hour_mean(*hour)),
        })
        .collect();
    println!();
    print_table(rows);

    Ok(())
}

fn print_alerts(alerts: &[Alert]) {
    if alerts.is_empty() {
        println!("{}", "✓ No alerts".green());
        return;
    }
    for alert in alerts {
        println!("{} {}", severity_label(alert.severity), alert.title.bold());
        println!("  {}", alert.message);
        for rec in &alert.recommendations {
            println!("  • {}", rec);
        }
        println!();
    }
}

fn alerts(session: &Session, file: &Path, meal: Option<MealContext>) -> Result<()> {
    let readings = session.readings(file)?;
    let snapshot = session.snapshot(&readings);
    let alerts = session.alert_generator().generate(snapshot.as_ref(), session.locale);
    let meal_recent = session.recent(&readings, session.config.settings.meal_window_days);
    let prediction =
        meal.and_then(|context| predict_for_meal(&meal_recent, context, session.locale));

    if session.json {
        #[derive(Serialize)]
        struct AlertsOutput<'a> {
            alerts: &'a [Alert],
            meal_prediction: Option<&'a glucors::MealPrediction>,
        }
        return print_json(&AlertsOutput {
            alerts: &alerts,
            meal_prediction: prediction.as_ref(),
        });
    }

    println!("{}", "Predictive Alerts".cyan().bold());
    print_alerts(&alerts);

    if let Some(prediction) = prediction {
        println!("{}", "Meal Prediction".cyan().bold());
        println!("  {}", prediction.message);
        for suggestion in &prediction.food_suggestions {
            println!("  • {}", suggestion);
        }
    }

    Ok(())
}

fn food(session: &Session, name: &str, file: Option<&Path>) -> Result<()> {
    let snapshot = match file {
        Some(file) => session.snapshot(&session.readings(file)?),
        None => None,
    };

    let prediction = predict_food_impact_or_err(name, snapshot.as_ref(), session.locale)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if session.json {
        return print_json(&prediction);
    }

    println!("{}", prediction.food.cyan().bold());
    println!("  Glucose impact:   {:?}", prediction.glucose_impact);
    println!(
        "  Estimated spike:  {}",
        format!("+{:.1} mg/dL", prediction.estimated_spike).bold()
    );
    for rec in &prediction.recommendations {
        println!("  • {}", rec);
    }
    Ok(())
}

#[derive(Tabled)]
struct FoodRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "kcal")]
    calories: u16,
    #[tabled(rename = "Carbs g")]
    carbs: String,
    #[tabled(rename = "Fiber g")]
    fiber: String,
    #[tabled(rename = "GI")]
    glycemic_index: u8,
    #[tabled(rename = "Impact")]
    impact: String,
}

fn foods(
    session: &Session,
    impact: Option<ImpactTier>,
    friendly: bool,
    limit: bool,
    diet: Option<DiabetesType>,
) -> Result<()> {
    let selected: Vec<&FoodEntry> = if let Some(tier) = impact {
        foods_by_impact(tier)
    } else if friendly {
        diabetes_friendly_foods()
    } else if limit {
        foods_to_limit()
    } else {
        all_foods().iter().collect()
    };

    let diet = diet.map(|t| diet_recommendations(t, session.locale));

    if session.json {
        #[derive(Serialize)]
        struct FoodsOutput {
            foods: Vec<glucors::foods::FoodListing>,
            #[serde(skip_serializing_if = "Option::is_none")]
            diet_recommendations: Option<Vec<String>>,
        }
        return print_json(&FoodsOutput {
            foods: selected.iter().map(|f| f.localized(session.locale)).collect(),
            diet_recommendations: diet,
        });
    }

    let rows: Vec<FoodRow> = selected
        .iter()
        .map(|f| FoodRow {
            key: f.key.to_string(),
            name: f.name.get(session.locale).to_string(),
            calories: f.calories,
            carbs: format!("{:.1}", f.carbs),
            fiber: format!("{:.1}", f.fiber),
            glycemic_index: f.glycemic_index,
            impact: format!("{:?}", f.impact),
        })
        .collect();
    print_table(rows);

    if let Some(diet) = diet {
        println!();
        println!("{}", "Diet Recommendations".cyan().bold());
        if diet.is_empty() {
            println!("  No specific recommendations for this diabetes type");
        }
        for tip in diet {
            println!("  • {}", tip);
        }
    }
    Ok(())
}

fn progress(session: &Session, file: &Path, all: bool) -> Result<()> {
    let readings = session.readings(file)?;
    let report = evaluate_progress(&readings, session.today, session.locale);

    if session.json {
        if all {
            return print_json(&available_badges(&readings, session.locale));
        }
        return print_json(&report);
    }

    let p = &report.progress;
    println!("{}", "Progress".cyan().bold());
    println!("  Current streak:   {} days", p.current_streak.to_string().bold());
    println!("  Total readings:   {}", p.total_readings);
    println!("  This week:        {}", p.weekly_readings);
    println!("  Level:            {} ({})", p.level.level, p.level.title.green());
    println!("  Points:           {}", p.total_points);

    #[derive(Tabled)]
    struct BadgeRow {
        #[tabled(rename = "")]
        icon: String,
        #[tabled(rename = "Badge")]
        name: String,
        #[tabled(rename = "Description")]
        description: String,
        #[tabled(rename = "Points")]
        points: u32,
        #[tabled(rename = "Earned")]
        earned: String,
    }

    let rows: Vec<BadgeRow> = if all {
        available_badges(&readings, session.locale)
            .into_iter()
            .map(|b| BadgeRow {
                icon: b.badge.icon,
                name: b.badge.name,
                description: b.badge.description,
                points: b.badge.points,
                earned: if b.earned { "✓" } else { "" }.to_string(),
            })
            .collect()
    } else {
        report
            .badges
            .into_iter()
            .map(|b| BadgeRow {
                icon: b.icon,
                name: b.name,
                description: b.description,
                points: b.points,
                earned: "✓".to_string(),
            })
            .collect()
    };

    println!();
    if rows.is_empty() {
        println!("{}", "No badges earned yet".dimmed());
    } else {
        print_table(rows);
    }
    Ok(())
}

fn challenges(session: &Session, file: &Path, date: Option<NaiveDate>) -> Result<()> {
    let readings = session.readings(file)?;
    let target = date.unwrap_or(session.today);
    let status = daily_challenges(&readings, Some(target), session.locale);

    if session.json {
        return print_json(&status);
    }

    println!("{}", format!("Daily Challenges for {}", target).cyan().bold());
    for challenge in status {
        let mark = if challenge.status.completed {
            "✓".green()
        } else {
            "○".dimmed()
        };
        println!(
            "  {} {} {} ({} pts, progress {})",
            mark, challenge.icon, challenge.name, challenge.points, challenge.status.progress
        );
        println!("      {}", challenge.description.dimmed());
    }
    Ok(())
}

fn print_list(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}", heading.bold());
    for item in items {
        println!("  • {}", item);
    }
}

fn evaluate(session: &Session, value: f64, context: MealContext) -> Result<()> {
    let reading = Reading::new(value, session.today).with_context(context);
    let evaluation = reading.evaluate(session.locale);
    let guide = food_recommendations_by_status(reading.glucose_status());

    if session.json {
        #[derive(Serialize)]
        struct EvaluateOutput<'a> {
            evaluation: &'a glucors::models::ReadingEvaluation,
            food_guide: &'a StatusFoodGuide,
        }
        return print_json(&EvaluateOutput {
            evaluation: &evaluation,
            food_guide: &guide,
        });
    }

    let status = format!("{:?}", evaluation.status).to_uppercase();
    let status = match evaluation.color {
        StatusColor::Green => status.green().bold(),
        StatusColor::Yellow => status.yellow().bold(),
        StatusColor::Red => status.red().bold(),
    };
    println!("{} {:.0} mg/dL ({})", status, value, context);
    for suggestion in &evaluation.suggestions {
        println!("  • {}", suggestion);
    }
    println!();

    match &guide {
        StatusFoodGuide::High {
            avoid,
            recommended,
            tips,
        } => {
            print_list("Avoid", avoid);
            print_list("Recommended", recommended);
            println!("{}", tips.dimmed());
        }
        StatusFoodGuide::Low {
            immediate,
            follow_up,
            tips,
        } => {
            print_list("Eat now", immediate);
            print_list("Follow up with", follow_up);
            println!("{}", tips.dimmed());
        }
        StatusFoodGuide::Normal {
            maintain,
            snacks,
            tips,
        } => {
            print_list("Keep eating", maintain);
            print_list("Snacks", snacks);
            println!("{}", tips.dimmed());
        }
    }
    Ok(())
}

fn advice(session: &Session) -> Result<()> {
    let profile = &session.config.profile;
    let advice = advice_for(profile);
    let education = education_for(profile.diabetes_type);

    if session.json {
        #[derive(Serialize)]
        struct AdviceOutput<'a> {
            advice: &'a glucors::insights::PersonalAdvice,
            education: &'a [String],
        }
        return print_json(&AdviceOutput {
            advice: &advice,
            education: &education,
        });
    }

    println!("{}", "Personal Advice".cyan().bold());
    print_list("Nutrition", &advice.nutrition);
    print_list("Exercise", &advice.exercise);
    print_list("Medication", &advice.medication);
    if !education.is_empty() {
        println!();
        println!("{}", "Learn More".cyan().bold());
        for line in &education {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn insights(session: &Session, file: &Path) -> Result<()> {
    let readings = session.readings(file)?;
    let trend = weekly_trend(&readings, session.today);
    let insights = personalized_insights(&readings, &session.config.profile, session.today, session.locale);

    if session.json {
        #[derive(Serialize)]
        struct InsightsOutput<'a> {
            weekly_trend: &'a glucors::insights::GlucoseTrend,
            insights: &'a [glucors::insights::Insight],
        }
        return print_json(&InsightsOutput {
            weekly_trend: &trend,
            insights: &insights,
        });
    }

    println!("{}", "Weekly Trend".cyan().bold());
    println!(
        "  {:?}, average {} mg/dL over {} readings",
        trend.trend,
        fmt_opt(trend.average),
        trend.readings_count
    );
    println!();
    println!("{}", "Insights".cyan().bold());
    for insight in insights {
        println!("{} {}", severity_label(insight.priority), insight.title.bold());
        println!("  {}", insight.content);
    }
    Ok(())
}

/// Print as JSON, or write to `output` when given
fn emit<T: Serialize>(data: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            export_json(data, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", format!("✓ Report written to {}", path.display()).green());
            Ok(())
        }
        None => print_json(data),
    }
}

fn report(
    session: &Session,
    file: Option<&Path>,
    batch: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let builder = ReportBuilder::new()
        .with_analyzer(session.analyzer())
        .with_alerts(session.alert_generator())
        .with_default_diabetes_type(session.config.settings.default_diabetes_type)
        .with_windows(
            session.config.settings.analysis_window_days,
            session.config.settings.meal_window_days,
        );

    if let Some(batch) = batch {
        let users = load_snapshots(batch)
            .with_context(|| format!("Failed to load snapshots from {}", batch.display()))?;
        let reports = builder.build_batch(&users, session.today, session.locale);
        return emit(&reports, output);
    }

    let file = file.context("Either --file or --batch is required")?;
    let user = UserSnapshot {
        user_id: "local".to_string(),
        profile: session.config.profile.clone(),
        readings: session.readings(file)?,
    };
    let report = builder.build(&user, session.today, session.locale);

    if output.is_some() || session.json {
        return emit(&report, output);
    }

    println!("{}", format!("Dashboard for {}", report.as_of).cyan().bold());
    println!(
        "Streak {} · Level {} ({}) · {} points",
        report.progress.current_streak,
        report.progress.level.level,
        report.progress.level.title,
        report.progress.total_points
    );
    println!();
    print_alerts(&report.alerts);
    if let Some(prediction) = &report.meal_prediction {
        println!("{}", prediction.message.yellow());
    }
    for insight in &report.insights {
        println!("{} {}", severity_label(insight.priority), insight.title);
    }
    Ok(())
}

fn configure(session: &mut Session, list: bool, set: Option<String>, get: Option<String>) -> Result<()> {
    if let Some(key_value) = set {
        let (key, value) = key_value
            .split_once('=')
            .context("Expected key=value")?;
        session.config.set_value(key.trim(), value.trim())?;
        session.config.save_to_file(&session.config_path)?;
        println!("{}", format!("✓ {} = {}", key.trim(), value.trim()).green());
    } else if let Some(key) = get {
        println!("{}", session.config.get_value(&key)?);
    } else if list || session.json {
        if session.json {
            return print_json(&session.config);
        }
        println!("{}", format!("Configuration ({})", session.config_path.display()).cyan().bold());
        for key in CONFIG_KEYS {
            println!("  {:<34} {}", key, session.config.get_value(key)?);
        }
    } else {
        println!("Use --list, --get <key> or --set <key=value>");
    }
    Ok(())
}
