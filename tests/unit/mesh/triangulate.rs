use super::*;

fn corners(w: f64, h: f64) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, h),
        Point::new(w, 0.0),
        Point::new(w, h),
    ]
}

fn total_area(mesh: &TriangleMesh, pts: &[Point]) -> f64 {
    mesh.triangles()
        .iter()
        .map(|t| signed_area2(pts[t[0]], pts[t[1]], pts[t[2]]).abs() / 2.0)
        .sum()
}

#[test]
fn corner_only_set_covers_canvas() {
    let pts = corners(40.0, 30.0);
    let mesh = TriangleMesh::triangulate(&pts).unwrap();
    assert_eq!(mesh.len(), 2);
    assert_eq!(total_area(&mesh, &pts), 1200.0);
}

#[test]
fn interior_point_is_used() {
    let mut pts = corners(40.0, 40.0);
    pts.push(Point::new(15.0, 22.0));
    let mesh = TriangleMesh::triangulate(&pts).unwrap();
    assert_eq!(mesh.len(), 4);
    assert!(mesh.triangles().iter().all(|t| t.contains(&4)));
    assert_eq!(total_area(&mesh, &pts), 1600.0);
    assert_eq!(mesh.out_of_range_count(pts.len()), 0);
}

#[test]
fn too_few_points_never_reach_the_triangulator() {
    struct Panicking;
    impl Triangulator for Panicking {
        fn triangulate(&self, _points: &[Point]) -> MorphResult<Vec<[usize; 3]>> {
            panic!("must not be called");
        }
    }

    let pts = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
    assert!(matches!(
        TriangleMesh::triangulate_with(&Panicking, &pts),
        Err(MorphError::InsufficientPoints { found: 2 })
    ));
}

#[test]
fn collinear_input_is_rejected() {
    let pts = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(2.0, 2.0),
    ];
    assert!(matches!(
        TriangleMesh::triangulate(&pts),
        Err(MorphError::Validation(_))
    ));
}

#[test]
fn collaborator_output_is_checked() {
    struct Fixed(Vec<[usize; 3]>);
    impl Triangulator for Fixed {
        fn triangulate(&self, _points: &[Point]) -> MorphResult<Vec<[usize; 3]>> {
            Ok(self.0.clone())
        }
    }

    let pts = corners(10.0, 10.0);
    // Degenerate (repeated vertex) triples are dropped.
    let mesh = TriangleMesh::triangulate_with(&Fixed(vec![[0, 1, 2], [0, 0, 3]]), &pts).unwrap();
    assert_eq!(mesh.triangles(), &[[0, 1, 2]]);

    assert!(TriangleMesh::triangulate_with(&Fixed(vec![[0, 1, 9]]), &pts).is_err());
}

#[test]
fn unchecked_mesh_reports_out_of_range_triples() {
    let mesh = TriangleMesh::from_triangles(vec![[0, 1, 2], [1, 2, 7]]);
    assert_eq!(mesh.out_of_range_count(4), 1);
    assert_eq!(
        serde_json::to_string(&mesh).unwrap(),
        "[[0,1,2],[1,2,7]]"
    );
}
