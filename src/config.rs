use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use transit_heatmap::{
    Avoid, BoundingRectangle, DEFAULT_GRADES, DEFAULT_MAX_DURATION_MINS, DEFAULT_STEP_METERS,
    DEFAULT_WORKERS, DepartureTime, FetchPlan, LatLng, MAX_BATCH_SIZE, OverlayFormat,
    PipelineConfig, RenderConfig, TrafficModel, TransitModes, TransitRoutingPreference,
    TravelMode, TravelOptions, Units, parse_local_time,
};

/// Travel-time heatmaps from the Google Distance Matrix API.
///
/// `fetch` samples a rectangle and stores the travel times as JSON, `render`
/// turns a stored run into a KML or GeoJSON overlay, and `run` does both.
#[derive(Parser, Debug, Clone)]
#[command(name = "transit-heatmap", version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sample the area and save the travel times as JSON.
    Fetch {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Where to write the JSON result store (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a saved result store as an overlay.
    Render {
        /// Result store written by `fetch`
        input: PathBuf,

        #[command(flatten)]
        render: RenderArgs,

        /// Where to write the overlay (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch and render in one go.
    Run {
        #[command(flatten)]
        fetch: FetchArgs,

        #[command(flatten)]
        render: RenderArgs,

        /// Also keep the fetched result store at this path
        #[arg(long)]
        save: Option<PathBuf>,

        /// Where to write the overlay (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export a saved result store as CSV.
    ExportCsv {
        /// Result store written by `fetch`
        input: PathBuf,

        /// Destination CSV file
        output: PathBuf,
    },
}

/// Arguments describing what to sample and how to query the service.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// One corner of the sampled rectangle, as `lat,lng`
    #[arg(allow_hyphen_values = true)]
    pub start: LatLng,

    /// The opposite corner, as `lat,lng`
    #[arg(allow_hyphen_values = true)]
    pub end: LatLng,

    /// Destination every sample point is routed to, as `lat,lng`
    #[arg(long = "destination", visible_alias = "dst", allow_hyphen_values = true)]
    pub destination: LatLng,

    /// Distance matrix API key.
    ///
    /// Environment variable: `GOOGLE_MAPS_API_KEY`
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub key: String,

    /// Spacing between sample points in meters
    #[arg(long, default_value_t = DEFAULT_STEP_METERS)]
    pub step: f64,

    /// Number of concurrent requests.
    ///
    /// Environment variable: `HEATMAP_WORKERS`
    #[arg(long, env = "HEATMAP_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Origins per request (at most 25)
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    pub batch_size: usize,

    /// driving, walking, bicycling or transit
    #[arg(long)]
    pub mode: Option<TravelMode>,

    /// tolls, highways or ferries
    #[arg(long)]
    pub avoid: Option<Avoid>,

    /// metric or imperial
    #[arg(long)]
    pub units: Option<Units>,

    /// Preferred transit modes, e.g. `bus|subway`
    #[arg(long)]
    pub transit_mode: Option<TransitModes>,

    /// less_walking or fewer_transfers
    #[arg(long)]
    pub transit_routing_preference: Option<TransitRoutingPreference>,

    /// best_guess, pessimistic or optimistic
    #[arg(long)]
    pub traffic_model: Option<TrafficModel>,

    /// Language of the returned texts
    #[arg(long)]
    pub language: Option<String>,

    /// Departure time as `YYYY-MM-DD HH:MM` local time, or `now`
    #[arg(long)]
    pub departure_time: Option<String>,

    /// Arrival time as `YYYY-MM-DD HH:MM` local time
    #[arg(long)]
    pub arrival_time: Option<String>,
}

/// Arguments controlling classification and output format.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Travel time in minutes beyond which a cell is left transparent
    #[arg(long, default_value_t = DEFAULT_MAX_DURATION_MINS)]
    pub max_duration: u64,

    /// Number of colored zones
    #[arg(long, default_value_t = DEFAULT_GRADES)]
    pub grades: u32,

    /// kml or geojson
    #[arg(long, default_value_t = OverlayFormat::Kml)]
    pub format: OverlayFormat,
}

/// Validated settings for a fetch run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_key: String,
    pub plan: FetchPlan,
    pub pipeline: PipelineConfig,
}

impl TryFrom<FetchArgs> for FetchConfig {
    type Error = anyhow::Error;

    fn try_from(args: FetchArgs) -> Result<Self, Self::Error> {
        if args.key.trim().is_empty() {
            bail!("API key must not be empty (use --key or GOOGLE_MAPS_API_KEY)");
        }
        if !args.step.is_finite() || args.step <= 0.0 {
            bail!("--step must be a positive number of meters, got {}", args.step);
        }
        for (name, point) in [
            ("start", &args.start),
            ("end", &args.end),
            ("destination", &args.destination),
        ] {
            if !point.is_valid() {
                bail!("{name} {point} is outside the valid latitude/longitude range");
            }
        }
        if args.departure_time.is_some() && args.arrival_time.is_some() {
            bail!("--departure-time and --arrival-time cannot be combined");
        }

        let pipeline = PipelineConfig::new(args.batch_size, args.workers)?;

        let departure_time = args
            .departure_time
            .as_deref()
            .map(str::parse::<DepartureTime>)
            .transpose()
            .context("Invalid --departure-time")?;
        let arrival_time = args
            .arrival_time
            .as_deref()
            .map(parse_local_time)
            .transpose()
            .context("Invalid --arrival-time")?;

        let options = TravelOptions {
            mode: args.mode,
            avoid: args.avoid,
            units: args.units,
            transit_modes: args.transit_mode.unwrap_or_default(),
            transit_routing_preference: args.transit_routing_preference,
            traffic_model: args.traffic_model,
            language: args.language,
            departure_time,
            arrival_time,
        };

        Ok(Self {
            api_key: args.key,
            plan: FetchPlan {
                destination: args.destination,
                area: BoundingRectangle::new(&args.start, &args.end),
                step_meters: args.step,
                options,
            },
            pipeline,
        })
    }
}

/// Validated settings for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub config: RenderConfig,
    pub format: OverlayFormat,
}

impl TryFrom<RenderArgs> for RenderSettings {
    type Error = anyhow::Error;

    fn try_from(args: RenderArgs) -> Result<Self, Self::Error> {
        let max_duration = args
            .max_duration
            .checked_mul(60)
            .map(Duration::from_secs)
            .context("--max-duration is too large")?;

        Ok(Self {
            config: RenderConfig::new(max_duration, args.grades)?,
            format: args.format,
        })
    }
}
