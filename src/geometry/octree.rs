//! Point octree for radius queries.
//!
//! Built once per frame over one point set. Node bounds are tight boxes over
//! the points they hold, so a radius query only descends into nodes whose box
//! lies within `radius` of the query point.

use super::bbox::BoundingBox;
use crate::landmark::Point3D;

/// Leaf capacity before a node is split.
const LEAF_CAPACITY: usize = 8;

/// Hard depth limit. Coincident or non-finite points end up in a leaf here.
const MAX_DEPTH: usize = 12;

#[derive(Debug)]
enum Node {
    Leaf {
        bounds: BoundingBox,
        indices: Vec<usize>,
    },
    Branch {
        bounds: BoundingBox,
        children: Vec<usize>,
    },
}

impl Node {
    fn bounds(&self) -> &BoundingBox {
        match self {
            Node::Leaf { bounds, .. } | Node::Branch { bounds, .. } => bounds,
        }
    }
}

#[derive(Debug)]
pub struct Octree<'a> {
    points: &'a [Point3D],
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl<'a> Octree<'a> {
    pub fn build(points: &'a [Point3D]) -> Self {
        let mut tree = Self {
            points,
            nodes: Vec::new(),
            root: None,
        };
        if !points.is_empty() {
            let all: Vec<usize> = (0..points.len()).collect();
            tree.root = tree.insert_node(all, 0);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// ルートのバウンディングボックス
    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.root.map(|r| self.nodes[r].bounds())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn insert_node(&mut self, indices: Vec<usize>, depth: usize) -> Option<usize> {
        let subset: Vec<Point3D> = indices.iter().map(|&i| self.points[i]).collect();
        let bounds = BoundingBox::from_points(&subset, 0.0)?;

        if indices.len() <= LEAF_CAPACITY || depth >= MAX_DEPTH {
            return Some(self.push(Node::Leaf { bounds, indices }));
        }

        let center = bounds.center();
        let mut octants: [Vec<usize>; 8] = Default::default();
        for &i in &indices {
            let p = &self.points[i];
            let octant = ((p.x >= center.x) as usize) << 2
                | ((p.y >= center.y) as usize) << 1
                | (p.z >= center.z) as usize;
            octants[octant].push(i);
        }

        // 全点が同じ象限に入る場合は分割できない
        if octants.iter().any(|o| o.len() == indices.len()) {
            return Some(self.push(Node::Leaf { bounds, indices }));
        }

        let mut children = Vec::new();
        for octant in octants {
            if octant.is_empty() {
                continue;
            }
            if let Some(child) = self.insert_node(octant, depth + 1) {
                children.push(child);
            }
        }
        Some(self.push(Node::Branch { bounds, children }))
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// center から距離 radius 以内（境界含む）の点インデックスを out に追加する
    ///
    /// 出力順は木の走査順で、インデックス順ではない。
    pub fn query_radius(&self, center: &Point3D, radius: f32, out: &mut Vec<usize>) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.bounds().distance_to(center) > radius {
                continue;
            }
            match node {
                Node::Leaf { indices, .. } => {
                    for &i in indices {
                        if self.points[i].distance(center) <= radius {
                            out.push(i);
                        }
                    }
                }
                Node::Branch { children, .. } => stack.extend(children.iter().copied()),
            }
        }
    }
}
