use plotters::prelude::*;

use crate::collection::StationCollection;

/// Plots the station positions over the collection bounding box
pub fn plot_stations(collection: &StationCollection, filename: &str) {
    let bbox = collection.bounding_box();
    let lon_margin = (bbox.width() * 5e-2).max(1e-2);
    let lat_margin = (bbox.height() * 5e-2).max(1e-2);

    let plot = SVGBackend::new(filename, (768, 512)).into_drawing_area();
    plot.fill(&WHITE).unwrap();

    let mut chart = ChartBuilder::on(&plot)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .margin(10)
        .build_cartesian_2d(
            bbox.min_lon - lon_margin..bbox.max_lon + lon_margin,
            bbox.min_lat - lat_margin..bbox.max_lat + lat_margin,
        )
        .unwrap();
    chart
        .configure_mesh()
        .x_desc("Longitude [degree]")
        .y_desc("Latitude [degree]")
        .draw()
        .unwrap();

    let mut colors = colorous::TABLEAU10.iter().cycle();

    for record in collection.records() {
        let color = colors.next().unwrap();
        let rgb = RGBColor(color.r, color.g, color.b);
        chart
            .draw_series(std::iter::once(Circle::new(
                (record.position.lon, record.position.lat),
                5,
                rgb.filled(),
            )))
            .unwrap()
            .label(record.station.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), 5, rgb.filled()));
    }
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .unwrap();
}
