mod lifecycle;
mod propagate;
mod reconciliation;
mod render;
