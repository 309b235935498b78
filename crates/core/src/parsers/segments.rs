//! Coordinate clustering and segment construction.

use autosvg_protocol::{Point, Segment};

use super::tokens::parse_number;

/// A run of numeric values found between two command tokens.
pub type CoordinateCluster = Vec<f64>;

/// Partition the tokens that follow the move triple into coordinate clusters.
///
/// Numbers accumulate into the current cluster; any other token closes it and
/// starts a new one. The final cluster is always pushed, even when empty, so
/// data ending right after a command letter yields a trailing empty cluster.
/// Callers drop clusters that do not map to a segment.
pub fn group_clusters<'a, I>(tokens: I) -> Vec<CoordinateCluster>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut clusters = Vec::new();
    let mut current = CoordinateCluster::new();
    for token in tokens {
        match parse_number(token) {
            Some(value) => current.push(value),
            None => clusters.push(std::mem::take(&mut current)),
        }
    }
    clusters.push(current);
    clusters
}

/// Map one cluster to a segment by its length.
///
/// Two values form a straight segment, six form a cubic. Anything else is a
/// quirk of the engine output and produces nothing.
pub fn cluster_to_segment(cluster: &[f64]) -> Option<Segment> {
    match *cluster {
        [x, y] => Some(Segment::line(x, y)),
        [x1, y1, x2, y2, x, y] => Some(Segment::cubic(
            Point::new(x1, y1),
            Point::new(x2, y2),
            Point::new(x, y),
        )),
        _ => {
            tracing::trace!(len = cluster.len(), "dropping coordinate cluster");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_on_command_boundaries() {
        let clusters = group_clusters([
            "1", "2", "L", "3", "4", "C", "5", "6", "7", "8", "9", "10",
        ]);
        assert_eq!(
            clusters,
            vec![
                vec![1.0, 2.0],
                vec![3.0, 4.0],
                vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
            ]
        );
    }

    #[test]
    fn leading_command_opens_with_empty_cluster() {
        let clusters = group_clusters(["C", "1", "2", "3", "4", "5", "6"]);
        assert_eq!(clusters, vec![vec![], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]]);
    }

    #[test]
    fn trailing_command_flushes_empty_cluster() {
        let clusters = group_clusters(["1", "2", "Z"]);
        assert_eq!(clusters, vec![vec![1.0, 2.0], vec![]]);
    }

    #[test]
    fn empty_input_yields_single_empty_cluster() {
        let clusters = group_clusters(std::iter::empty::<&str>());
        assert_eq!(clusters, vec![Vec::<f64>::new()]);
    }

    #[test]
    fn segment_mapping_by_length() {
        assert_eq!(cluster_to_segment(&[3.0, 4.0]), Some(Segment::line(3.0, 4.0)));
        let cubic = cluster_to_segment(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(
            (cubic.x1, cubic.y1, cubic.x2, cubic.y2, cubic.x, cubic.y),
            (1.0, 2.0, 3.0, 4.0, 5.0, 6.0)
        );
        assert_eq!(cluster_to_segment(&[]), None);
        assert_eq!(cluster_to_segment(&[1.0, 2.0, 3.0, 4.0]), None);
        assert_eq!(cluster_to_segment(&[1.0; 8]), None);
    }
}
