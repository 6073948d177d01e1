/*!

# Quick start

This example runs an estimation end to end against a local estimation service
listening on `http://localhost:8000`.

Describe the project in a few sentences and send it:

```bash
effortview --text "A login page with email and password, and a password reset flow."
```

The summary comes first, followed by one table for the traditional models and
one for the machine learning models:

```text
Estimation Results
==================
Total effort:     12.30 person-months
Duration:         -
Team size:        -
Confidence level: -

Traditional Models
Model  | Effort (PM) | Confidence | Type
-------+-------------+------------+-------
cocomo | 11.80       | 75%        | COCOMO
```

The bar chart at the end uses a logarithmic axis by default. Use
`--scale linear` to change it, or `--compare-scales` to draw both.

Save the normalized result with `--out result.json`. It can be rendered again
later without the service:

```bash
effortview --response result.json --scale linear
```

`--reference expected.json` compares the normalized result with a previous
one and fails with a diff when they differ.

 */
