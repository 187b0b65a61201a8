// src/challenge.rs
// Angle-of-elevation word problems and missing-angle triangles shown in the challenge clips,
// with their closed-form answers and the geometry the renderer draws.
// Lengths are in metres, angles in degrees.

use crate::error::{ClipError, Result};

/// Point in figure coordinates (metres, y up).
pub type Point = (f64, f64);

/// An instrument `instrument_height` above level ground sights the top of a tower
/// `distance` away at `elevation_deg`. Unknown: the tower's height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationProblem {
    pub instrument_height: f64,
    pub distance: f64,
    pub elevation_deg: f64,
}

impl ElevationProblem {
    /// x = h₀ + d·tan θ
    pub fn solution(&self) -> f64 {
        self.instrument_height + self.distance * self.elevation_deg.to_radians().tan()
    }
}

/// Two observation points `baseline` apart on the same side of a tower see its top at
/// `far_deg` (farther point) and `near_deg` (nearer point). Unknown: the tower's height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoAngleProblem {
    pub baseline: f64,
    pub far_deg: f64,
    pub near_deg: f64,
}

impl TwoAngleProblem {
    /// h = d·tan α·tan β / (tan β − tan α)
    pub fn solution(&self) -> f64 {
        let ta = self.far_deg.to_radians().tan();
        let tb = self.near_deg.to_radians().tan();
        self.baseline * ta * tb / (tb - ta)
    }

    /// Horizontal distance from the nearer point to the tower's base.
    pub fn near_distance(&self) -> f64 {
        self.solution() / self.near_deg.to_radians().tan()
    }
}

/// A triangle with two of its angles given. Unknown: the third angle.
///
/// The stated angles are what the viewer reasons with; `vertices` only shape the drawing and
/// need not match them exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleProblem {
    pub vertices: [Point; 3],
    /// Stated interior angle at each vertex; `None` marks the unknown.
    pub angles_deg: [Option<f64>; 3],
}

impl TriangleProblem {
    /// Vertex carrying the unknown angle.
    pub fn unknown_vertex(&self) -> Option<usize> {
        self.angles_deg.iter().position(Option::is_none)
    }

    /// x = 180° − (sum of the given angles)
    pub fn solution(&self) -> f64 {
        180.0 - self.angles_deg.iter().flatten().sum::<f64>()
    }

    /// Arc marking the interior angle at vertex `i`, swept counter-clockwise.
    pub fn corner_arc(&self, i: usize, radius: f64) -> AngleArc {
        let v = self.vertices[i];
        let heading = |p: Point| (p.1 - v.1).atan2(p.0 - v.0).to_degrees();
        let to_next = heading(self.vertices[(i + 1) % 3]);
        let to_prev = heading(self.vertices[(i + 2) % 3]);
        // Counter-clockwise sweep from `to_next` to `to_prev`; the interior is the short way round.
        let sweep = (to_prev - to_next).rem_euclid(360.0);
        let (start_deg, end_deg) = if sweep <= 180.0 {
            (to_next, to_next + sweep)
        } else {
            (to_prev, to_prev + 360.0 - sweep)
        };
        AngleArc { center: v, radius, start_deg, end_deg }
    }
}

/// Which challenge set to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeLevel {
    Basic,
    Advanced,
    /// Three find-the-missing-angle triangles, cycling.
    Triangle,
}

impl ChallengeLevel {
    pub const ALL: [ChallengeLevel; 3] = [ChallengeLevel::Basic, ChallengeLevel::Advanced, ChallengeLevel::Triangle];

    pub fn name(self) -> &'static str {
        match self {
            ChallengeLevel::Basic => "basic",
            ChallengeLevel::Advanced => "advanced",
            ChallengeLevel::Triangle => "triangle",
        }
    }

    /// Output file stem.
    pub fn stem(self) -> String {
        match self {
            ChallengeLevel::Triangle => "triangle_angle_challenge".to_string(),
            level => format!("trig_challenge_{}", level.name()),
        }
    }

    /// Seconds each problem stays on screen; `None` shows one problem for the whole clip.
    pub fn problem_seconds(self) -> Option<u32> {
        match self {
            ChallengeLevel::Triangle => Some(5),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Challenge {
    Elevation(ElevationProblem),
    TwoAngle(TwoAngleProblem),
    Triangle(TriangleProblem),
}

/// Role of a stroke; decides its color and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeKind {
    Ground,
    Structure,
    Sight,
    Guide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub from: Point,
    pub to: Point,
    pub kind: StrokeKind,
}

/// Circular arc marking an angle, counter-clockwise from `start_deg` to `end_deg`.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleArc {
    pub center: Point,
    pub radius: f64,
    pub start_deg: f64,
    pub end_deg: f64,
}

impl AngleArc {
    /// Polyline approximation of the first `fraction` of the arc.
    pub fn points(&self, fraction: f64, segments: usize) -> Vec<Point> {
        let fraction = fraction.clamp(0.0, 1.0);
        let sweep = (self.end_deg - self.start_deg) * fraction;
        let n = segments.max(1);
        (0..=n)
            .map(|i| {
                let a = (self.start_deg + sweep * i as f64 / n as f64).to_radians();
                (
                    self.center.0 + self.radius * a.cos(),
                    self.center.1 + self.radius * a.sin(),
                )
            })
            .collect()
    }

    /// Point just outside the middle of the arc, for its label.
    pub fn label_anchor(&self) -> Point {
        let mid = ((self.start_deg + self.end_deg) / 2.0).to_radians();
        let r = self.radius * 1.45;
        (self.center.0 + r * mid.cos(), self.center.1 + r * mid.sin())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub at: Point,
    pub text: String,
}

/// Everything drawn for one challenge, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub strokes: Vec<Stroke>,
    pub arcs: Vec<(AngleArc, String)>,
    pub labels: Vec<Label>,
    /// Where the unknown `x` is written.
    pub unknown: Point,
}

impl Figure {
    /// Bounding box of strokes, labels and the unknown's marker.
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let points = self
            .strokes
            .iter()
            .flat_map(|s| [s.from, s.to])
            .chain(self.labels.iter().map(|l| l.at))
            .chain(self.arcs.iter().map(|(a, _)| a.label_anchor()))
            .chain(std::iter::once(self.unknown));
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for (px, py) in points {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
        (x, y)
    }
}

fn check_angle(name: &str, deg: f64) -> Result<()> {
    if deg.is_finite() && deg > 0.0 && deg < 90.0 {
        Ok(())
    } else {
        Err(ClipError::Config(format!("{name} must lie strictly between 0° and 90°, got {deg}")))
    }
}

fn check_length(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ClipError::Config(format!("{name} must be positive, got {v}")))
    }
}

fn metres(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{} m", v.round())
    } else {
        format!("{v:.1} m")
    }
}

fn degrees(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}°", v.round())
    } else {
        format!("{v:.1}°")
    }
}

impl Challenge {
    /// Instrument at 10 m, tower 62 m away, elevation 32°.
    pub fn basic() -> Self {
        Challenge::Elevation(ElevationProblem {
            instrument_height: 10.0,
            distance: 62.0,
            elevation_deg: 32.0,
        })
    }

    /// Observers 40 m apart see the top at 28° and 47°.
    pub fn advanced() -> Self {
        Challenge::TwoAngle(TwoAngleProblem {
            baseline: 40.0,
            far_deg: 28.0,
            near_deg: 47.0,
        })
    }

    /// The three triangles, in screen order.
    pub fn triangles() -> [Self; 3] {
        [
            TriangleProblem {
                vertices: [(-5.0, -5.0), (5.0, -5.0), (0.0, 5.0)],
                angles_deg: [Some(40.0), Some(60.0), None],
            },
            TriangleProblem {
                vertices: [(-6.0, -3.0), (6.0, -3.0), (0.0, 6.0)],
                angles_deg: [Some(35.0), None, Some(55.0)],
            },
            TriangleProblem {
                vertices: [(-4.0, -4.0), (7.0, -4.0), (2.0, 5.0)],
                angles_deg: [None, Some(28.0), Some(47.0)],
            },
        ]
        .map(Challenge::Triangle)
    }

    /// Problems shown for `level`, in order.
    pub fn problems(level: ChallengeLevel) -> Vec<Self> {
        match level {
            ChallengeLevel::Basic => vec![Self::basic()],
            ChallengeLevel::Advanced => vec![Self::advanced()],
            ChallengeLevel::Triangle => Self::triangles().to_vec(),
        }
    }

    /// Heading over the clip.
    pub fn title(&self) -> &'static str {
        match self {
            Challenge::Triangle(_) => "Geometry Challenge",
            _ => "Trigonometry Challenge",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Challenge::Elevation(p) => {
                check_length("instrument height", p.instrument_height)?;
                check_length("distance", p.distance)?;
                check_angle("elevation", p.elevation_deg)
            }
            Challenge::TwoAngle(p) => {
                check_length("baseline", p.baseline)?;
                check_angle("far angle", p.far_deg)?;
                check_angle("near angle", p.near_deg)?;
                if p.near_deg <= p.far_deg {
                    return Err(ClipError::Config(format!(
                        "near angle ({}°) must be steeper than far angle ({}°)",
                        p.near_deg, p.far_deg
                    )));
                }
                Ok(())
            }
            Challenge::Triangle(p) => {
                if p.angles_deg.iter().filter(|a| a.is_none()).count() != 1 {
                    return Err(ClipError::Config("a triangle needs exactly one unknown angle".into()));
                }
                for a in p.angles_deg.iter().flatten() {
                    if !(a.is_finite() && *a > 0.0) {
                        return Err(ClipError::Config(format!("triangle angle must be positive, got {a}")));
                    }
                }
                if p.solution() <= 0.0 {
                    return Err(ClipError::Config("given triangle angles leave nothing for x".into()));
                }
                let [a, b, c] = p.vertices;
                let area2 = (b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1);
                if area2.abs() < 1e-9 {
                    return Err(ClipError::Config("triangle vertices are collinear".into()));
                }
                Ok(())
            }
        }
    }

    /// Height of the tower, or the missing angle in degrees.
    pub fn solution(&self) -> f64 {
        match self {
            Challenge::Elevation(p) => p.solution(),
            Challenge::TwoAngle(p) => p.solution(),
            Challenge::Triangle(p) => p.solution(),
        }
    }

    /// Problem statement, one line per entry.
    pub fn statement(&self) -> Vec<String> {
        match self {
            Challenge::Elevation(p) => vec![
                format!("A sensor {} above the ground", metres(p.instrument_height)),
                format!("sees the top of a tower {} away", metres(p.distance)),
                format!("at an angle of elevation of {}.", degrees(p.elevation_deg)),
            ],
            Challenge::TwoAngle(p) => vec![
                format!("From two points {} apart,", metres(p.baseline)),
                format!(
                    "the top of a tower is seen at {} and {}.",
                    degrees(p.far_deg),
                    degrees(p.near_deg)
                ),
                "How tall is the tower?".to_string(),
            ],
            Challenge::Triangle(_) => vec!["Find angle x".to_string()],
        }
    }

    /// Revealed answer, e.g. `x ≈ 48.74 m` or `x = 80°`.
    pub fn answer(&self) -> String {
        match self {
            Challenge::Triangle(p) => format!("x = {}", degrees(p.solution())),
            _ => format!("x ≈ {:.2} m", self.solution()),
        }
    }

    pub fn figure(&self) -> Figure {
        match self {
            Challenge::Elevation(p) => elevation_figure(p),
            Challenge::TwoAngle(p) => two_angle_figure(p),
            Challenge::Triangle(p) => triangle_figure(p),
        }
    }
}

fn elevation_figure(p: &ElevationProblem) -> Figure {
    let d = p.distance;
    let h0 = p.instrument_height;
    let top = p.solution();
    let pad = d * 0.1;
    let eye = (0.0, h0);

    Figure {
        strokes: vec![
            Stroke { from: (-pad, 0.0), to: (d + pad, 0.0), kind: StrokeKind::Ground },
            Stroke { from: (0.0, 0.0), to: eye, kind: StrokeKind::Structure },
            Stroke { from: (d, 0.0), to: (d, top), kind: StrokeKind::Structure },
            Stroke { from: eye, to: (d, h0), kind: StrokeKind::Guide },
            Stroke { from: eye, to: (d, top), kind: StrokeKind::Sight },
        ],
        arcs: vec![(
            AngleArc { center: eye, radius: d * 0.18, start_deg: 0.0, end_deg: p.elevation_deg },
            degrees(p.elevation_deg),
        )],
        labels: vec![
            Label { at: (d / 2.0, -pad * 0.8), text: metres(d) },
            Label { at: (-pad * 0.9, h0 / 2.0), text: metres(h0) },
        ],
        unknown: (d + pad * 0.8, (h0 + top) / 2.0),
    }
}

fn two_angle_figure(p: &TwoAngleProblem) -> Figure {
    let d = p.baseline;
    let h = p.solution();
    let base = d + p.near_distance();
    let pad = base * 0.1;
    let a = (0.0, 0.0);
    let b = (d, 0.0);
    let top = (base, h);

    Figure {
        strokes: vec![
            Stroke { from: (-pad, 0.0), to: (base + pad, 0.0), kind: StrokeKind::Ground },
            Stroke { from: (base, 0.0), to: top, kind: StrokeKind::Structure },
            Stroke { from: a, to: top, kind: StrokeKind::Sight },
            Stroke { from: b, to: top, kind: StrokeKind::Sight },
        ],
        arcs: vec![
            (
                AngleArc { center: a, radius: base * 0.12, start_deg: 0.0, end_deg: p.far_deg },
                degrees(p.far_deg),
            ),
            (
                AngleArc { center: b, radius: base * 0.09, start_deg: 0.0, end_deg: p.near_deg },
                degrees(p.near_deg),
            ),
        ],
        labels: vec![Label { at: (d / 2.0, -pad * 0.8), text: metres(d) }],
        unknown: (base + pad * 0.8, h / 2.0),
    }
}

fn triangle_figure(p: &TriangleProblem) -> Figure {
    let v = p.vertices;
    let mut unknown = v[0];
    let arcs = (0..3)
        .map(|i| {
            let arc = p.corner_arc(i, 0.75);
            let text = match p.angles_deg[i] {
                Some(a) => degrees(a),
                None => {
                    // The red `x` goes where this corner's label would be.
                    unknown = arc.label_anchor();
                    String::new()
                }
            };
            (arc, text)
        })
        .collect();

    Figure {
        strokes: (0..3)
            .map(|i| Stroke { from: v[i], to: v[(i + 1) % 3], kind: StrokeKind::Structure })
            .collect(),
        arcs,
        labels: Vec::new(),
        unknown,
    }
}
