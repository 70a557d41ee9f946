use std::path::{Path, PathBuf};

use edi_collection::{
    CsvPointSink, MatchPolicy, PointLayerSink, StationCollection, StationLoader, TableBuilder,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "edi-collection",
    about = "Aggregating magnetotelluric station summaries"
)]
struct Opt {
    /// Directory of station summary files or an explicit file list
    #[structopt(required = true)]
    path: Vec<String>,
    /// Station identifier regular expression filter
    #[structopt(short, long)]
    station: Option<String>,
    /// Relative frequency matching window
    #[structopt(short, long, default_value = "0.05")]
    ptol: f64,
    /// Write the phase tensor & tipper tables to this directory
    #[structopt(short, long)]
    output: Option<String>,
    /// Keep the sample nearest to the grid frequency instead of the first match
    #[structopt(long)]
    nearest: bool,
    /// Period selection coverage threshold [%]
    #[structopt(short, long)]
    coverage: Option<f64>,
    /// Save the station points to a CSV file
    #[structopt(long = "stations-csv")]
    stations_csv: Option<String>,
    /// Plot the station map to `stations.svg`
    #[structopt(long)]
    plot: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut loader = StationLoader::default();
    loader = match opt.path.as_slice() {
        [path] if Path::new(path).is_dir() => loader.data_path(path),
        _ => loader.files(opt.path.iter().map(PathBuf::from)),
    };
    if let Some(arg) = opt.station {
        loader = loader.station_filter(arg);
    }

    let collection = StationCollection::new(loader.load()?, opt.ptol)?;
    collection.summary();

    if let Some(percentage) = opt.coverage {
        let periods = collection.periods_by_coverage(percentage);
        println!("{} periods at {}% coverage:", periods.len(), percentage);
        println!("{:#?}", periods);
    }

    if let Some(output_dir) = opt.output {
        let mut builder = TableBuilder::new(&collection).output_dir(&output_dir);
        if opt.nearest {
            builder = builder.match_policy(MatchPolicy::Nearest);
        }
        let tables = builder.write()?;
        println!("{} per-frequency tables written to {}", tables.len(), output_dir);
    }

    if let Some(filename) = opt.stations_csv {
        CsvPointSink::new(&filename).write_points(&collection.station_points())?;
        println!("station points written to {}", filename);
    }

    if opt.plot {
        #[cfg(feature = "plot")]
        edi_collection::plot::plot_stations(&collection, "stations.svg");
        #[cfg(not(feature = "plot"))]
        log::warn!("built without the `plot` feature, station map skipped");
    }

    Ok(())
}
