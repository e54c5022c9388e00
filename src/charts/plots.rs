//! Figure builders for each analysis.

use super::colours::DriverStyle;
use super::figure::{Axis, Figure, Layout, Trace};
use crate::minisector::LapPoint;
use crate::telemetry::{CarSample, DriverLaps, LapRecord, SessionInfo};

/// Single-driver lap time chart served by `/get_lap_times`.
pub fn driver_lap_times(season: i32, track: &str, driver: &str, laps: &DriverLaps) -> Figure {
    let (x, y) = lap_time_series(laps);

    Figure {
        data: vec![
            Trace::scatter(format!("{driver}'s Lap Times"), x, y)
                .mode("lines+markers")
                .hover("Lap: %{x}<br>Time: %{y} seconds<extra></extra>"),
        ],
        layout: Layout::new(format!("Lap Time Chart for {driver} - {track} {season}"))
            .axis("xaxis", Axis::titled("Lap Number"))
            .axis("yaxis", Axis::titled("Lap Time (seconds)")),
    }
}

pub fn lap_time_comparison(
    session: &SessionInfo,
    styles: &[DriverStyle; 2],
    laps: [&DriverLaps; 2],
) -> Figure {
    let data = styles
        .iter()
        .zip(laps)
        .map(|(style, laps)| {
            let (x, y) = lap_time_series(laps);
            Trace::scatter(style.label.clone(), x, y).colour(&style.colour, 2.0)
        })
        .collect();

    Figure {
        data,
        layout: Layout::new(format!("Lap Time Comparison<br>{}", session.title()))
            .axis("xaxis", Axis::titled("Lap Number"))
            .axis("yaxis", Axis::titled("Lap Time (seconds)")),
    }
}

/// Speed against distance over each driver's fastest lap.
pub fn fastest_lap_comparison(
    session: &SessionInfo,
    styles: &[DriverStyle; 2],
    laps: [&LapRecord; 2],
) -> Figure {
    let data = styles
        .iter()
        .zip(laps)
        .map(|(style, lap)| {
            let (x, y) = channel(&lap.telemetry, |s| s.speed);
            Trace::scatter(style.label.clone(), x, y).colour(&style.colour, 1.5)
        })
        .collect();

    Figure {
        data,
        layout: Layout::new(format!("Fastest Lap Comparison<br>{}", session.title()))
            .axis("xaxis", Axis::titled("Distance (m)"))
            .axis("yaxis", Axis::titled("Speed (km/h)")),
    }
}

/// Track map of one lap coloured by the faster driver of each minisector.
pub fn fastest_sectors_map(
    session: &SessionInfo,
    styles: &[DriverStyle; 2],
    points: &[LapPoint],
    lap: u32,
) -> Figure {
    let mut data = Vec::new();
    let mut shown = [false, false];

    let runs = traversals(points)
        .into_iter()
        .flat_map(|lap| split_runs(&lap));

    for (driver, run) in runs {
        let Some(idx) = styles.iter().position(|s| s.code == driver) else {
            continue;
        };
        let style = &styles[idx];
        let (x, y): (Vec<f64>, Vec<f64>) = run.into_iter().unzip();
        data.push(
            Trace::scatter(style.label.clone(), x, y)
                .colour(&style.colour, 4.0)
                .legend(style.code.clone(), !shown[idx]),
        );
        shown[idx] = true;
    }

    // Keep both drivers in the legend even if one never led a minisector.
    for (idx, style) in styles.iter().enumerate() {
        if !shown[idx] {
            data.push(
                Trace::scatter(style.label.clone(), Vec::new(), Vec::new())
                    .colour(&style.colour, 4.0)
                    .legend(style.code.clone(), true),
            );
        }
    }

    let hidden = Axis {
        visible: Some(false),
        ..Default::default()
    };

    Figure {
        data,
        layout: Layout::new(format!(
            "Average Fastest Sectors Lap {lap}<br>{}",
            session.title()
        ))
        .axis("xaxis", hidden.clone())
        .axis(
            "yaxis",
            Axis {
                scaleanchor: Some("x".to_string()),
                ..hidden
            },
        ),
    }
}

/// Stacked delta/speed/throttle/brake/RPM/gear panels over the fastest laps.
///
/// `delta` is the second driver's gap to the first, as `(distance, seconds)`.
pub fn full_telemetry(
    session: &SessionInfo,
    styles: &[DriverStyle; 2],
    laps: [&LapRecord; 2],
    delta: &[(f64, f64)],
) -> Figure {
    const PANELS: [(&str, Option<[f64; 2]>); 6] = [
        ("Delta (s)", None),
        ("Speed (km/h)", None),
        ("Throttle (%)", Some([0.0, 100.0])),
        ("Brake", Some([0.0, 100.0])),
        ("RPM", None),
        ("Gear", None),
    ];
    let channels: [fn(&CarSample) -> f64; 5] = [
        |s: &CarSample| s.speed,
        |s: &CarSample| s.throttle,
        |s: &CarSample| if s.brake { 100.0 } else { 0.0 },
        |s: &CarSample| s.rpm,
        |s: &CarSample| s.gear as f64,
    ];

    let mut data = Vec::new();

    let (dx, dy): (Vec<f64>, Vec<f64>) = delta.iter().copied().unzip();
    if let (Some(first), Some(last)) = (dx.first(), dx.last()) {
        data.push(
            Trace::scatter("", vec![*first, *last], vec![0.0, 0.0])
                .colour("#FFFFFF", 0.5)
                .legend("zero", false),
        );
    }
    data.push(
        Trace::scatter(styles[1].label.clone(), dx, dy)
            .colour(&styles[1].colour, 1.5)
            .legend(styles[1].code.clone(), false),
    );

    for (panel, pick) in channels.iter().enumerate() {
        for (style, lap) in styles.iter().zip(laps) {
            let (x, y) = channel(&lap.telemetry, *pick);
            data.push(
                Trace::scatter(style.label.clone(), x, y)
                    .colour(&style.colour, 1.0)
                    .on_axes(panel + 2)
                    .legend(style.code.clone(), panel == 0),
            );
        }
    }

    let mut layout = Layout::new(format!(
        "Fastest Lap Telemetry - {} vs {}<br>{}",
        styles[0].label,
        styles[1].label,
        session.title()
    ));
    layout.height = Some(1000);

    let rows = PANELS.len();
    let gap = 0.02;
    for (row, (label, range)) in PANELS.iter().enumerate() {
        let n = row + 1;
        let (xk, yk) = axis_keys(n);
        let top = 1.0 - row as f64 / rows as f64;
        let bottom = 1.0 - (row + 1) as f64 / rows as f64 + gap;

        layout = layout
            .axis(
                &xk,
                Axis {
                    title: (n == rows).then(|| "Distance (m)".into()),
                    anchor: Some(axis_ref('y', n)),
                    matches: (n > 1).then(|| "x".to_string()),
                    visible: Some(n == rows),
                    ..Default::default()
                },
            )
            .axis(
                &yk,
                Axis {
                    title: Some((*label).into()),
                    domain: Some([bottom, top]),
                    range: *range,
                    anchor: Some(axis_ref('x', n)),
                    ..Default::default()
                },
            );
    }

    Figure { data, layout }
}

fn lap_time_series(laps: &DriverLaps) -> (Vec<f64>, Vec<f64>) {
    laps.lap_times()
        .into_iter()
        .map(|(n, t)| (n as f64, t))
        .unzip()
}

fn channel(samples: &[CarSample], pick: impl Fn(&CarSample) -> f64) -> (Vec<f64>, Vec<f64>) {
    samples.iter().map(|s| (s.distance, pick(s))).unzip()
}

fn axis_keys(n: usize) -> (String, String) {
    if n == 1 {
        ("xaxis".into(), "yaxis".into())
    } else {
        (format!("xaxis{n}"), format!("yaxis{n}"))
    }
}

fn axis_ref(letter: char, n: usize) -> String {
    if n == 1 {
        letter.to_string()
    } else {
        format!("{letter}{n}")
    }
}

/// Points split by the driver whose samples they are, in order of first
/// appearance. Each group is one traversal of the track and is drawn as its
/// own path.
fn traversals(points: &[LapPoint]) -> Vec<Vec<LapPoint>> {
    let mut groups: Vec<Vec<LapPoint>> = Vec::new();
    for p in points {
        match groups.iter_mut().find(|g| g[0].driver == p.driver) {
            Some(g) => g.push(p.clone()),
            None => groups.push(vec![p.clone()]),
        }
    }
    groups
}

/// Consecutive points grouped by fastest driver. A run also ends on the first point
/// of the next run so the drawn line stays connected.
pub fn split_runs(points: &[LapPoint]) -> Vec<(String, Vec<(f64, f64)>)> {
    let mut runs: Vec<(String, Vec<(f64, f64)>)> = Vec::new();

    for p in points {
        let same = runs.last().is_some_and(|(d, _)| *d == p.fastest_driver);
        if let Some((_, run)) = runs.last_mut() {
            run.push((p.x, p.y));
        }
        if !same {
            runs.push((p.fastest_driver.clone(), vec![(p.x, p.y)]));
        }
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::DriverInfo;

    fn session() -> SessionInfo {
        SessionInfo {
            key: "1".into(),
            year: 2023,
            event_name: "Bahrain Grand Prix".into(),
            session_name: "Race".into(),
            drivers: vec![DriverInfo { acronym: "VER".into(), number: 1, team_colour: None }],
        }
    }

    fn styles() -> [DriverStyle; 2] {
        [
            DriverStyle { code: "VER".into(), label: "VER".into(), colour: "#3671C6".into() },
            DriverStyle { code: "LEC".into(), label: "LEC".into(), colour: "#E8002D".into() },
        ]
    }

    fn point(x: f64, driver: &str) -> LapPoint {
        LapPoint { x, y: 0.0, driver: "VER".into(), fastest_driver: driver.into() }
    }

    fn point_of(x: f64, source: &str, driver: &str) -> LapPoint {
        LapPoint { driver: source.into(), ..point(x, driver) }
    }

    #[test]
    fn test_split_runs_shares_joints() {
        let points = vec![
            point(0.0, "VER"),
            point(1.0, "VER"),
            point(2.0, "LEC"),
            point(3.0, "LEC"),
            point(4.0, "VER"),
        ];

        let runs = split_runs(&points);
        let xs: Vec<(&str, Vec<f64>)> = runs
            .iter()
            .map(|(d, r)| (d.as_str(), r.iter().map(|p| p.0).collect()))
            .collect();

        assert_eq!(
            xs,
            vec![
                ("VER", vec![0.0, 1.0, 2.0]),
                ("LEC", vec![2.0, 3.0, 4.0]),
                ("VER", vec![4.0]),
            ]
        );
    }

    #[test]
    fn test_split_runs_empty() {
        assert!(split_runs(&[]).is_empty());
    }

    #[test]
    fn test_driver_lap_times_title_and_series() {
        let laps = DriverLaps {
            driver: "VER".into(),
            laps: vec![
                LapRecord { lap_number: 1, lap_time: Some(97.0), telemetry: vec![] },
                LapRecord { lap_number: 2, lap_time: None, telemetry: vec![] },
                LapRecord { lap_number: 3, lap_time: Some(95.5), telemetry: vec![] },
            ],
        };

        let fig = driver_lap_times(2023, "Bahrain Grand Prix", "VER", &laps);

        assert_eq!(fig.layout.title.text, "Lap Time Chart for VER - Bahrain Grand Prix 2023");
        assert_eq!(fig.data[0].x, vec![1.0, 3.0]);
        assert_eq!(fig.data[0].y, vec![97.0, 95.5]);
        assert_eq!(fig.data[0].mode, "lines+markers");
    }

    #[test]
    fn test_sector_map_keeps_both_drivers_in_legend() {
        let points = vec![point(0.0, "VER"), point(1.0, "VER")];

        let fig = fastest_sectors_map(&session(), &styles(), &points, 3);

        assert_eq!(fig.data.len(), 2);
        assert_eq!(fig.data[0].showlegend, Some(true));
        assert_eq!(fig.data[1].name, "LEC");
        assert!(fig.data[1].x.is_empty());
        assert!(fig.layout.title.text.starts_with("Average Fastest Sectors Lap 3"));
    }

    #[test]
    fn test_sector_map_draws_each_traversal_separately() {
        let points = vec![
            point_of(0.0, "VER", "VER"),
            point_of(1.0, "VER", "LEC"),
            point_of(10.0, "LEC", "LEC"),
            point_of(11.0, "LEC", "LEC"),
        ];

        let fig = fastest_sectors_map(&session(), &styles(), &points, 1);

        let xs: Vec<(&str, Vec<f64>)> = fig
            .data
            .iter()
            .map(|t| (t.name.as_str(), t.x.clone()))
            .collect();
        assert_eq!(
            xs,
            vec![
                ("VER", vec![0.0, 1.0]),
                ("LEC", vec![1.0]),
                ("LEC", vec![10.0, 11.0]),
            ]
        );
        assert_eq!(fig.data[2].showlegend, Some(false));
    }

    #[test]
    fn test_full_telemetry_panels() {
        let lap = LapRecord {
            lap_number: 1,
            lap_time: Some(90.0),
            telemetry: vec![
                CarSample { distance: 0.0, speed: 100.0, brake: true, gear: 3, ..Default::default() },
                CarSample { distance: 10.0, speed: 120.0, gear: 4, ..Default::default() },
            ],
        };

        let fig = full_telemetry(&session(), &styles(), [&lap, &lap], &[(0.0, 0.0), (10.0, 0.0)]);

        // zero line + delta + 5 channels x 2 drivers
        assert_eq!(fig.data.len(), 12);
        assert_eq!(fig.layout.axes.len(), 12);
        assert_eq!(fig.layout.axes["yaxis4"].range, Some([0.0, 100.0]));
        let brake = fig.data.iter().find(|t| t.yaxis.as_deref() == Some("y4")).unwrap();
        assert_eq!(brake.y, vec![100.0, 0.0]);
        let gear = fig.data.iter().find(|t| t.yaxis.as_deref() == Some("y6")).unwrap();
        assert_eq!(gear.y, vec![3.0, 4.0]);
    }
}
